use crate::invariants::{
    debug_assert_bounded_count, debug_assert_closed_monotonic, debug_assert_len_mirror,
    debug_assert_open_for_insert,
};
use crate::{Config, EnqueueError, Metrics, QueueError};
use crossbeam_utils::CachePadded;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

// =============================================================================
// SYNCHRONIZATION STRATEGY
// =============================================================================
//
// One mutex guards the buffer, the closed flag, the waiter counts and the
// metrics. Two condition variables hang off it:
//
// - `not_empty`: consumers park here while the buffer is empty and open
// - `not_full`:  producers park here while the buffer is full and open
//
// Every wait sits inside a loop that re-evaluates the predicate after waking,
// so spurious wakeups and barging threads are harmless. The lock is never held
// while user code runs (batch handlers run after unlocking) and notifications
// are issued after the guard is dropped.
//
// `len` and `closed` are mirrored into atomics. Mirrors are only written while
// the lock is held; readers that only need an advisory answer (`len()`,
// `is_closed()`, `state()`) skip the lock entirely.
//
// Wake order among threads blocked on the same condition is whatever the
// underlying condvar picks. It is not FIFO among waiters.
//
// =============================================================================

/// Coarse state of a queue, as seen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueState {
    /// Accepting items and has free space.
    OpenNotFull,
    /// Accepting items but producers would block.
    OpenFull,
    /// Closed with items still waiting to be drained.
    ClosedNonEmpty,
    /// Closed and drained; every call now fails with `Closed`.
    ClosedEmpty,
}

/// Bounded multi-producer multi-consumer blocking queue.
///
/// Producers block while the queue is full, consumers block while it is empty.
/// [`close`](Self::close) stops intake: blocked producers get their item back
/// with [`QueueError::Closed`], consumers keep receiving buffered items until
/// the queue is drained and then get `Closed` as well.
///
/// The handle is cheap to clone; every clone refers to the same queue. Items
/// still buffered when the last handle is dropped are dropped with it.
///
/// # Example
///
/// ```
/// use boundq_rs::BoundedQueue;
/// use std::thread;
///
/// let queue = BoundedQueue::<u64>::new(4).unwrap();
///
/// let producer = {
///     let queue = queue.clone();
///     thread::spawn(move || {
///         for i in 0..10 {
///             queue.enqueue(i).unwrap();
///         }
///         queue.close();
///     })
/// };
///
/// let received: Vec<u64> = queue.iter().collect();
/// producer.join().unwrap();
/// assert_eq!(received, (0..10).collect::<Vec<_>>());
/// ```
pub struct BoundedQueue<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    state: Mutex<State<T>>,
    /// Signalled when an item is inserted (and on close)
    not_empty: Condvar,
    /// Signalled when space frees up (and on close)
    not_full: Condvar,
    /// Advisory mirror of `state.buffer.len()`
    len: CachePadded<AtomicUsize>,
    /// Advisory mirror of `state.closed`
    closed: CachePadded<AtomicBool>,
    config: Config,
}

struct State<T> {
    buffer: VecDeque<T>,
    closed: bool,
    waiting_producers: usize,
    waiting_consumers: usize,
    metrics: Option<Metrics>,
}

impl<T> State<T> {
    #[inline]
    fn record(&mut self, update: impl FnOnce(&mut Metrics)) {
        if let Some(metrics) = self.metrics.as_mut() {
            update(metrics);
        }
    }
}

impl<T> Inner<T> {
    #[inline]
    fn capacity(&self) -> usize {
        self.config.capacity
    }

    fn push(&self, state: &mut State<T>, item: T) {
        debug_assert_open_for_insert!(state.closed);
        debug_assert_len_mirror!(self.len.load(Ordering::Relaxed), state.buffer.len());

        state.buffer.push_back(item);
        let len = state.buffer.len();
        debug_assert_bounded_count!(len, self.capacity());

        self.len.store(len, Ordering::Release);
        state.record(|m| m.enqueued += 1);
    }

    fn pop(&self, state: &mut State<T>) -> Option<T> {
        debug_assert_len_mirror!(self.len.load(Ordering::Relaxed), state.buffer.len());

        let item = state.buffer.pop_front()?;
        self.len.store(state.buffer.len(), Ordering::Release);
        state.record(|m| m.dequeued += 1);
        Some(item)
    }

    /// Inserts `item` and wakes one consumer. Consumes the guard so the
    /// notification happens after unlocking.
    fn push_and_notify(&self, mut state: MutexGuard<'_, State<T>>, item: T) {
        self.push(&mut state, item);
        let wake = state.waiting_consumers > 0;
        drop(state);
        if wake {
            self.not_empty.notify_one();
        }
    }

    /// Removes the head item and wakes one producer.
    fn pop_and_notify(&self, mut state: MutexGuard<'_, State<T>>) -> Option<T> {
        let item = self.pop(&mut state)?;
        let wake = state.waiting_producers > 0;
        drop(state);
        if wake {
            self.not_full.notify_one();
        }
        Some(item)
    }

    fn enqueue(&self, item: T, timeout: Option<Duration>) -> Result<(), EnqueueError<T>> {
        let deadline = deadline_after(timeout);
        let mut state = self.state.lock();
        let mut waited = false;

        loop {
            if state.closed {
                state.record(|m| m.rejected += 1);
                if waited {
                    trace!("blocked enqueue released by close");
                }
                return Err(EnqueueError::new(QueueError::Closed, item));
            }

            if state.buffer.len() < self.capacity() {
                self.push_and_notify(state, item);
                return Ok(());
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    state.record(|m| m.timeouts += 1);
                    trace!(?timeout, "enqueue timed out");
                    return Err(EnqueueError::new(QueueError::TimedOut, item));
                }
            }

            if !waited {
                state.record(|m| m.producer_waits += 1);
                waited = true;
            }

            state.waiting_producers += 1;
            wait(&self.not_full, &mut state, deadline);
            state.waiting_producers -= 1;
        }
    }

    fn dequeue(&self, timeout: Option<Duration>) -> Result<T, QueueError> {
        let deadline = deadline_after(timeout);
        let mut state = self.state.lock();
        let mut waited = false;

        loop {
            // Drain before honoring `closed`.
            if !state.buffer.is_empty() {
                return self.pop_and_notify(state).ok_or(QueueError::Empty);
            }

            if state.closed {
                if waited {
                    trace!("blocked dequeue released by close");
                }
                return Err(QueueError::Closed);
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    state.record(|m| m.timeouts += 1);
                    trace!(?timeout, "dequeue timed out");
                    return Err(QueueError::TimedOut);
                }
            }

            if !waited {
                state.record(|m| m.consumer_waits += 1);
                waited = true;
            }

            state.waiting_consumers += 1;
            wait(&self.not_empty, &mut state, deadline);
            state.waiting_consumers -= 1;
        }
    }
}

/// A timeout that overflows `Instant` is treated as "wait forever".
#[inline]
fn deadline_after(timeout: Option<Duration>) -> Option<Instant> {
    timeout.and_then(|t| Instant::now().checked_add(t))
}

#[inline]
fn wait<T>(condvar: &Condvar, state: &mut MutexGuard<'_, State<T>>, deadline: Option<Instant>) {
    match deadline {
        // The caller re-checks both the predicate and the deadline, so the
        // timeout result itself is not needed.
        Some(deadline) => {
            let _ = condvar.wait_until(state, deadline);
        }
        None => condvar.wait(state),
    }
}

impl<T> BoundedQueue<T> {
    /// Creates a queue holding at most `capacity` items.
    ///
    /// Fails with [`QueueError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        Self::with_config(Config::with_capacity(capacity))
    }

    /// Creates a queue from a full configuration.
    pub fn with_config(config: Config) -> Result<Self, QueueError> {
        config.validate()?;

        debug!(
            capacity = config.capacity,
            metrics = config.enable_metrics,
            "bounded queue created"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    buffer: VecDeque::with_capacity(config.capacity),
                    closed: false,
                    waiting_producers: 0,
                    waiting_consumers: 0,
                    metrics: config.enable_metrics.then(Metrics::new),
                }),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                len: CachePadded::new(AtomicUsize::new(0)),
                closed: CachePadded::new(AtomicBool::new(false)),
                config,
            }),
        })
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Inserts `item` at the tail, blocking while the queue is full.
    ///
    /// Returns `Closed` (with the item) if the queue is closed before space
    /// becomes available.
    pub fn enqueue(&self, item: T) -> Result<(), EnqueueError<T>> {
        self.inner.enqueue(item, None)
    }

    /// Inserts `item` without blocking.
    ///
    /// Returns `Closed` if the queue is closed, otherwise `Full` if there is
    /// no free slot. The item is handed back in either case.
    pub fn try_enqueue(&self, item: T) -> Result<(), EnqueueError<T>> {
        let mut state = self.inner.state.lock();

        if state.closed {
            state.record(|m| m.rejected += 1);
            return Err(EnqueueError::new(QueueError::Closed, item));
        }
        if state.buffer.len() >= self.inner.capacity() {
            state.record(|m| m.rejected += 1);
            return Err(EnqueueError::new(QueueError::Full, item));
        }

        self.inner.push_and_notify(state, item);
        Ok(())
    }

    /// Like [`enqueue`](Self::enqueue), but gives up with `TimedOut` once
    /// `timeout` has elapsed without space freeing up or the queue closing.
    pub fn enqueue_timeout(&self, item: T, timeout: Duration) -> Result<(), EnqueueError<T>> {
        self.inner.enqueue(item, Some(timeout))
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Removes the head item, blocking while the queue is empty.
    ///
    /// After [`close`](Self::close), buffered items are still returned; `Closed`
    /// is reported only once the queue is both closed and empty.
    pub fn dequeue(&self) -> Result<T, QueueError> {
        self.inner.dequeue(None)
    }

    /// Removes the head item without blocking.
    ///
    /// Returns `Empty` if nothing is buffered and the queue is open, `Closed`
    /// if nothing is buffered and the queue is closed.
    pub fn try_dequeue(&self) -> Result<T, QueueError> {
        let state = self.inner.state.lock();

        if state.buffer.is_empty() {
            return Err(if state.closed {
                QueueError::Closed
            } else {
                QueueError::Empty
            });
        }

        self.inner.pop_and_notify(state).ok_or(QueueError::Empty)
    }

    /// Like [`dequeue`](Self::dequeue), but gives up with `TimedOut` once
    /// `timeout` has elapsed without an item arriving or the queue closing.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Result<T, QueueError> {
        self.inner.dequeue(Some(timeout))
    }

    /// Takes every buffered item and hands each to `handler` in FIFO order.
    ///
    /// Never blocks on an empty queue. The items are removed under a single
    /// lock acquisition and the handler runs after the lock is released, so it
    /// may freely call back into the queue.
    ///
    /// Returns the number of items handled.
    pub fn consume_all<F>(&self, handler: F) -> usize
    where
        F: FnMut(T),
    {
        self.consume_up_to(usize::MAX, handler)
    }

    /// Takes at most `max_total` buffered items and hands each to `handler`.
    ///
    /// Useful to bound the time spent per batch.
    pub fn consume_up_to<F>(&self, max_total: usize, mut handler: F) -> usize
    where
        F: FnMut(T),
    {
        let batch: Vec<T> = {
            let mut state = self.inner.state.lock();
            debug_assert_len_mirror!(self.inner.len.load(Ordering::Relaxed), state.buffer.len());

            let n = max_total.min(state.buffer.len());
            if n == 0 {
                return 0;
            }

            let batch: Vec<T> = state.buffer.drain(..n).collect();
            self.inner.len.store(state.buffer.len(), Ordering::Release);
            state.record(|m| m.dequeued += n as u64);

            let wake = state.waiting_producers > 0;
            drop(state);
            if wake {
                // Several slots may have opened up at once.
                self.inner.not_full.notify_all();
            }
            batch
        };

        let consumed = batch.len();
        for item in batch {
            handler(item);
        }
        consumed
    }

    /// Blocking iterator over the queue. Each call to `next()` is a
    /// [`dequeue`](Self::dequeue); iteration ends once the queue is closed and
    /// drained.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { queue: self }
    }

    // ---------------------------------------------------------------------
    // SHUTDOWN
    // ---------------------------------------------------------------------

    /// Closes the queue.
    ///
    /// Further enqueues fail with `Closed`; consumers drain what is buffered
    /// and then see `Closed`. Every blocked producer and consumer is woken so
    /// it can observe the new state.
    ///
    /// Idempotent: returns `true` for the call that actually closed the queue
    /// and `false` for every later call.
    pub fn close(&self) -> bool {
        let mut state = self.inner.state.lock();

        let was_closed = state.closed;
        state.closed = true;
        debug_assert_closed_monotonic!(was_closed, state.closed);
        if was_closed {
            return false;
        }
        self.inner.closed.store(true, Ordering::Release);

        let buffered = state.buffer.len();
        let waiting_producers = state.waiting_producers;
        let waiting_consumers = state.waiting_consumers;
        drop(state);

        self.inner.not_full.notify_all();
        self.inner.not_empty.notify_all();

        debug!(buffered, waiting_producers, waiting_consumers, "bounded queue closed");
        true
    }

    // ---------------------------------------------------------------------
    // OBSERVATION (advisory)
    // ---------------------------------------------------------------------

    /// Returns the configured capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Returns the configuration the queue was built with.
    #[inline]
    pub fn config(&self) -> Config {
        self.inner.config
    }

    /// Returns the number of buffered items.
    ///
    /// Advisory only: the value may be stale by the time the caller acts on it.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len.load(Ordering::Acquire)
    }

    /// Returns true if nothing is buffered. Advisory only.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if every slot is taken. Advisory only.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// Returns true if the queue has been closed.
    ///
    /// Once this returns `true` it never returns `false` again.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Returns the coarse queue state. Advisory only.
    pub fn state(&self) -> QueueState {
        let closed = self.is_closed();
        let len = self.len();
        match (closed, len) {
            (false, len) if len >= self.capacity() => QueueState::OpenFull,
            (false, _) => QueueState::OpenNotFull,
            (true, 0) => QueueState::ClosedEmpty,
            (true, _) => QueueState::ClosedNonEmpty,
        }
    }

    /// Get a metrics snapshot. All zeros unless metrics were enabled.
    pub fn metrics(&self) -> Metrics {
        self.inner.state.lock().metrics.unwrap_or_default()
    }
}

impl<T> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Blocking iterator returned by [`BoundedQueue::iter`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    queue: &'a BoundedQueue<T>,
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        // Without a timeout, the only failure is Closed.
        self.queue.dequeue().ok()
    }
}

impl<'a, T> IntoIterator for &'a BoundedQueue<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
