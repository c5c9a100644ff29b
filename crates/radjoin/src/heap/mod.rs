//! Indexable binary heap.
//!
//! [`IndexedHeap`] is an array-backed binary heap over `(key, priority)` pairs
//! with an auxiliary key-to-slot map. The map is what makes in-place updates
//! cheap: [`IndexedHeap::set_priority`] and [`IndexedHeap::decrement`] find a
//! key's slot in O(1) and re-heapify in O(log n), instead of scanning the
//! array.
//!
//! The ordering is a runtime [`HeapOrder`] value, so the same type serves as a
//! max-heap (coverage selection, keyed by uncovered degree) and as a min-heap
//! (deficit selection, keyed by squared deviation).
//!
//! # Example
//!
//! ```
//! use radjoin::heap::{HeapOrder, IndexedHeap};
//!
//! let mut heap = IndexedHeap::new(HeapOrder::Max, 8);
//! heap.insert(1_u32, 10_i64)?;
//! heap.insert(2, 12)?;
//! heap.decrement(2)?;
//! heap.decrement(2)?;
//! heap.decrement(2)?;
//!
//! assert_eq!(heap.pop(), Some((1, 10)));
//! assert_eq!(heap.pop(), Some((2, 9)));
//! # Ok::<(), radjoin::heap::HeapError>(())
//! ```
//!
//! # Stale entries
//!
//! The heap knows nothing about the caller's notion of validity. Callers that
//! invalidate entries as a side effect of other work (a point becoming
//! covered) leave them in place and discard them when popped.

mod indexed;
mod order;

pub use indexed::IndexedHeap;
pub use order::{HeapOrder, MissingKeyPolicy, UnitStep};

use thiserror::Error;

/// Errors returned by [`IndexedHeap`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
    /// The key is not present in the heap.
    #[error("key not found in heap")]
    KeyNotFound,

    /// The key is already present; keys must be unique.
    #[error("key already present in heap")]
    DuplicateKey,

    /// The heap is at capacity.
    #[error("heap capacity exceeded: {capacity} live entries")]
    CapacityExceeded {
        /// The fixed capacity of the heap.
        capacity: usize,
    },
}
