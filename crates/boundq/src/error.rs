//! Error types for queue operations.

use std::fmt;
use thiserror::Error;

/// Outcome of a queue operation that did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum QueueError {
    /// The queue was configured with a capacity of zero.
    #[error("queue capacity must be at least 1")]
    InvalidCapacity,

    /// The queue is full and the call was not allowed to wait.
    #[error("queue is full")]
    Full,

    /// The queue is empty and the call was not allowed to wait.
    #[error("queue is empty")]
    Empty,

    /// The wait exceeded its timeout.
    #[error("timed out waiting on the queue")]
    TimedOut,

    /// The queue is closed (and, for consumers, fully drained).
    #[error("queue is closed")]
    Closed,
}

impl QueueError {
    /// Returns `true` if retrying the same call later may succeed.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Full | Self::Empty | Self::TimedOut)
    }

    /// Returns `true` if this error means the queue will never make progress
    /// for this kind of call again.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// A rejected enqueue. The item is handed back to the caller.
#[derive(Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct EnqueueError<T> {
    kind: QueueError,
    item: T,
}

impl<T> EnqueueError<T> {
    #[inline]
    pub(crate) fn new(kind: QueueError, item: T) -> Self {
        Self { kind, item }
    }

    /// Why the item was rejected: `Full`, `TimedOut` or `Closed`.
    #[inline]
    pub fn kind(&self) -> QueueError {
        self.kind
    }

    /// Borrows the rejected item.
    #[inline]
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Takes back ownership of the rejected item.
    #[inline]
    pub fn into_inner(self) -> T {
        self.item
    }

    /// Returns `true` if the queue was full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.kind == QueueError::Full
    }

    /// Returns `true` if the queue was closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.kind == QueueError::Closed
    }

    /// Returns `true` if the wait timed out.
    #[inline]
    pub fn is_timeout(&self) -> bool {
        self.kind == QueueError::TimedOut
    }
}

// Items are often not `Debug`; the kind is what matters in logs.
impl<T> fmt::Debug for EnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnqueueError")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T> From<EnqueueError<T>> for QueueError {
    fn from(err: EnqueueError<T>) -> Self {
        err.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(QueueError::Full.is_recoverable());
        assert!(QueueError::Empty.is_recoverable());
        assert!(QueueError::TimedOut.is_recoverable());
        assert!(!QueueError::Closed.is_recoverable());
        assert!(QueueError::Closed.is_terminal());
        assert!(!QueueError::InvalidCapacity.is_terminal());
    }

    #[test]
    fn test_enqueue_error_returns_item() {
        struct NotDebug(u32);

        let err = EnqueueError::new(QueueError::Closed, NotDebug(7));
        assert!(err.is_closed());
        assert_eq!(err.to_string(), "queue is closed");
        assert!(format!("{:?}", err).contains("Closed"));
        assert_eq!(err.into_inner().0, 7);
    }

    #[test]
    fn test_enqueue_error_into_queue_error() {
        let err: QueueError = EnqueueError::new(QueueError::Full, "x").into();
        assert_eq!(err, QueueError::Full);
    }
}
