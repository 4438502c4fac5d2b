//! Property-based tests against a sequential `VecDeque` model.
//!
//! Each case drives a queue with a random sequence of non-blocking operations
//! and checks every outcome against the model, plus the data-model invariants:
//! bounded count, FIFO delivery, and closed being terminal.

use boundq_rs::{BoundedQueue, QueueError, QueueState};
use proptest::prelude::*;
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Op {
    TryEnqueue(u32),
    EnqueueNoWait(u32),
    TryDequeue,
    DequeueNoWait,
    ConsumeUpTo(usize),
    Close,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u32>().prop_map(Op::TryEnqueue),
        2 => any::<u32>().prop_map(Op::EnqueueNoWait),
        3 => Just(Op::TryDequeue),
        2 => Just(Op::DequeueNoWait),
        1 => (0usize..6).prop_map(Op::ConsumeUpTo),
        1 => Just(Op::Close),
    ]
}

struct Model {
    items: VecDeque<u32>,
    capacity: usize,
    closed: bool,
}

impl Model {
    fn enqueue_outcome(&mut self, item: u32, full_error: QueueError) -> Result<(), QueueError> {
        if self.closed {
            Err(QueueError::Closed)
        } else if self.items.len() >= self.capacity {
            Err(full_error)
        } else {
            self.items.push_back(item);
            Ok(())
        }
    }

    fn dequeue_outcome(&mut self, empty_error: QueueError) -> Result<u32, QueueError> {
        match self.items.pop_front() {
            Some(item) => Ok(item),
            None if self.closed => Err(QueueError::Closed),
            None => Err(empty_error),
        }
    }
}

proptest! {
    /// Every outcome matches the model and count never exceeds capacity.
    #[test]
    fn prop_matches_sequential_model(
        capacity in 1usize..8,
        ops in prop::collection::vec(op_strategy(), 1..200),
    ) {
        let queue = BoundedQueue::new(capacity).unwrap();
        let mut model = Model { items: VecDeque::new(), capacity, closed: false };

        for op in ops {
            match op {
                Op::TryEnqueue(v) => {
                    let expected = model.enqueue_outcome(v, QueueError::Full);
                    let actual = queue.try_enqueue(v).map_err(|e| {
                        let kind = e.kind();
                        assert_eq!(e.into_inner(), v, "rejected item not returned");
                        kind
                    });
                    prop_assert_eq!(actual, expected);
                }
                Op::EnqueueNoWait(v) => {
                    let expected = model.enqueue_outcome(v, QueueError::TimedOut);
                    let actual = queue.enqueue_timeout(v, Duration::ZERO).map_err(|e| e.kind());
                    prop_assert_eq!(actual, expected);
                }
                Op::TryDequeue => {
                    let expected = model.dequeue_outcome(QueueError::Empty);
                    prop_assert_eq!(queue.try_dequeue(), expected);
                }
                Op::DequeueNoWait => {
                    let expected = model.dequeue_outcome(QueueError::TimedOut);
                    prop_assert_eq!(queue.dequeue_timeout(Duration::ZERO), expected);
                }
                Op::ConsumeUpTo(max) => {
                    let n = max.min(model.items.len());
                    let expected: Vec<u32> = model.items.drain(..n).collect();
                    let mut actual = Vec::new();
                    let consumed = queue.consume_up_to(max, |item| actual.push(item));
                    prop_assert_eq!(consumed, n);
                    prop_assert_eq!(actual, expected);
                }
                Op::Close => {
                    let first = !model.closed;
                    model.closed = true;
                    prop_assert_eq!(queue.close(), first);
                }
            }

            prop_assert!(queue.len() <= capacity,
                "bounded count violated: len {} > capacity {}", queue.len(), capacity);
            prop_assert_eq!(queue.len(), model.items.len());
            prop_assert_eq!(queue.is_closed(), model.closed);
        }
    }
}

proptest! {
    /// Items come out in exactly the order their enqueues completed.
    #[test]
    fn prop_fifo_law(items in prop::collection::vec(any::<u64>(), 0..64)) {
        let queue = BoundedQueue::new(items.len().max(1)).unwrap();
        for &item in &items {
            prop_assert!(queue.try_enqueue(item).is_ok());
        }
        queue.close();

        let drained: Vec<u64> = queue.iter().collect();
        prop_assert_eq!(drained, items);
        prop_assert_eq!(queue.state(), QueueState::ClosedEmpty);
    }
}

proptest! {
    /// Once closed, the queue never accepts anything again, whatever follows.
    #[test]
    fn prop_closed_is_terminal(
        prefill in 0usize..4,
        ops in prop::collection::vec(op_strategy(), 0..50),
    ) {
        let queue = BoundedQueue::new(4).unwrap();
        for i in 0..prefill {
            queue.enqueue(i as u32).unwrap();
        }
        queue.close();

        for op in ops {
            match op {
                Op::TryEnqueue(v) | Op::EnqueueNoWait(v) => {
                    let err = queue.try_enqueue(v).unwrap_err();
                    prop_assert_eq!(err.kind(), QueueError::Closed);
                }
                Op::TryDequeue | Op::DequeueNoWait => {
                    let _ = queue.try_dequeue();
                }
                Op::ConsumeUpTo(max) => {
                    queue.consume_up_to(max, |_| {});
                }
                Op::Close => {
                    prop_assert!(!queue.close());
                }
            }
            prop_assert!(queue.is_closed());
            prop_assert!(queue.len() <= prefill);
        }
    }
}
