//! boundq - Bounded Multi-Producer Multi-Consumer Blocking Queue
//!
//! A fixed-capacity FIFO shared between OS threads. Producers block while the
//! queue is full, consumers block while it is empty, and a single `close()`
//! call shuts intake down while letting consumers drain what is left.
//!
//! # Key Features
//!
//! - Blocking, non-blocking (`try_*`) and timed (`*_timeout`) variants
//! - Graceful shutdown: closed queues reject new items but drain buffered ones
//! - Rejected items are handed back to the caller inside [`EnqueueError`]
//! - Batch consumption API (one lock acquisition for N items)
//! - Lock-free advisory observers (`len`, `is_closed`, `state`)
//!
//! Wake order among threads blocked on the same condition is unspecified; it is
//! not FIFO among waiters. Items themselves are always delivered in FIFO order
//! of completed enqueues.
//!
//! # Example
//!
//! ```
//! use boundq_rs::{BoundedQueue, QueueError};
//!
//! let queue = BoundedQueue::<u64>::new(2).unwrap();
//!
//! queue.enqueue(1).unwrap();
//! queue.enqueue(2).unwrap();
//!
//! // Non-blocking insert on a full queue hands the item back
//! let rejected = queue.try_enqueue(3).unwrap_err();
//! assert_eq!(rejected.kind(), QueueError::Full);
//! assert_eq!(rejected.into_inner(), 3);
//!
//! queue.close();
//!
//! // Buffered items survive close
//! assert_eq!(queue.dequeue(), Ok(1));
//! assert_eq!(queue.dequeue(), Ok(2));
//! assert_eq!(queue.dequeue(), Err(QueueError::Closed));
//! ```

mod config;
mod error;
mod invariants;
mod metrics;
mod queue;

pub use config::{Config, LARGE_CONFIG, SMALL_CONFIG};
pub use error::{EnqueueError, QueueError};
pub use metrics::Metrics;
pub use queue::{BoundedQueue, Iter, QueueState};
