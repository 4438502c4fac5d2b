/// Snapshot of queue activity counters.
///
/// Counters are only maintained when the queue was built with
/// `Config::enable_metrics`; otherwise every field stays zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    /// Items accepted by any enqueue variant.
    pub enqueued: u64,
    /// Items handed to consumers (including batch consumption).
    pub dequeued: u64,
    /// Times a producer had to wait for free space.
    pub producer_waits: u64,
    /// Times a consumer had to wait for an item.
    pub consumer_waits: u64,
    /// Timed calls that gave up.
    pub timeouts: u64,
    /// Enqueues refused because the queue was full or closed.
    pub rejected: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items currently accounted as buffered (`enqueued - dequeued`).
    #[inline]
    pub fn in_flight(&self) -> u64 {
        self.enqueued.saturating_sub(self.dequeued)
    }
}
