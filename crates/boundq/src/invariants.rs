//! Debug assertion macros for queue invariants.
//!
//! They are only active in debug builds (`#[cfg(debug_assertions)]`), so there
//! is zero overhead in release builds.

// =============================================================================
// Bounded count
// =============================================================================

/// Assert that the buffered count does not exceed capacity.
///
/// **Invariant**: `0 ≤ count ≤ capacity`
///
/// Used in: every insertion path after pushing onto the buffer
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "bounded count violated: count {} exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

// =============================================================================
// Closed is terminal
// =============================================================================

/// Assert that an insertion never happens on a closed queue.
///
/// **Invariant**: `closed → no further inserts`
///
/// Used in: `State::push()` before touching the buffer
macro_rules! debug_assert_open_for_insert {
    ($closed:expr) => {
        debug_assert!(
            !$closed,
            "closed-terminal violated: inserting into a closed queue"
        )
    };
}

/// Assert that the closed flag never reverts.
///
/// **Invariant**: `closed_before → closed_after`
///
/// Used in: `BoundedQueue::close()`
macro_rules! debug_assert_closed_monotonic {
    ($before:expr, $after:expr) => {
        debug_assert!(
            !$before || $after,
            "closed-terminal violated: closed flag reverted to open"
        )
    };
}

// =============================================================================
// Lock-free mirrors
// =============================================================================

/// Assert that the advisory length mirror agrees with the locked buffer.
///
/// Only meaningful while the lock is held, since every mirror store happens
/// under the lock.
///
/// Used in: `State::push()`, `State::pop()`, batch consumption
macro_rules! debug_assert_len_mirror {
    ($mirror:expr, $actual:expr) => {
        debug_assert_eq!(
            $mirror, $actual,
            "length mirror {} disagrees with buffered count {}",
            $mirror, $actual
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_closed_monotonic;
pub(crate) use debug_assert_len_mirror;
pub(crate) use debug_assert_open_for_insert;
