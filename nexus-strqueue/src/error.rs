//! Error types for queue operations and invariant checks.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::storage::Exhausted;

/// Why a queue operation was rejected.
///
/// Every rejected operation leaves the queue exactly as it was.
#[derive(Debug, Error)]
pub enum QueueError {
    /// An argument was absent or unusable (missing queue, missing value,
    /// empty output buffer, value containing NUL).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A node slot or the copied text could not be allocated.
    ///
    /// `source` is `None` when a configured node limit was hit rather than
    /// the allocator failing.
    #[error("allocation failed")]
    AllocationFailure {
        /// Allocator error, if any.
        #[source]
        source: Option<TryReserveError>,
    },

    /// Removal was attempted on an empty queue.
    #[error("queue is empty")]
    Empty,
}

impl From<TryReserveError> for QueueError {
    fn from(err: TryReserveError) -> Self {
        Self::AllocationFailure { source: Some(err) }
    }
}

impl<T> From<Exhausted<T>> for QueueError {
    fn from(err: Exhausted<T>) -> Self {
        Self::AllocationFailure { source: err.source }
    }
}

/// A broken chain invariant, as reported by `validate`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// `len == 0`, `head == NONE` and `tail == NONE` disagree.
    #[error("empty state disagrees: len={len}, head_none={head_none}, tail_none={tail_none}")]
    EmptyState {
        /// Cached length.
        len: usize,
        /// Whether head is the null link.
        head_none: bool,
        /// Whether tail is the null link.
        tail_none: bool,
    },

    /// A link points at a slot with no node in it.
    #[error("link to vacant slot {key}")]
    DanglingLink {
        /// Slot index of the bad link.
        key: usize,
    },

    /// More nodes are reachable than the cached length allows; either the
    /// chain has a cycle or the length is stale.
    #[error("more than {len} nodes reachable from head")]
    Overrun {
        /// Cached length.
        len: usize,
    },

    /// Fewer nodes are reachable than the cached length.
    #[error("cached len is {cached} but {counted} nodes are reachable")]
    LengthMismatch {
        /// Cached length.
        cached: usize,
        /// Nodes actually reachable from head.
        counted: usize,
    },

    /// The cached tail is not the last reachable node.
    #[error("tail is slot {tail} but the last reachable node is slot {last}")]
    TailMismatch {
        /// Slot index of the cached tail.
        tail: usize,
        /// Slot index of the last reachable node.
        last: usize,
    },

    /// The arena holds nodes that the chain does not reach.
    #[error("{occupied} arena slots are occupied but only {linked} nodes are linked")]
    OrphanNodes {
        /// Occupied arena slots.
        occupied: usize,
        /// Nodes linked into the chain.
        linked: usize,
    },

    /// A stored value contains a NUL byte.
    #[error("value in slot {key} contains a NUL byte")]
    InteriorNul {
        /// Slot index of the offending node.
        key: usize,
    },
}
