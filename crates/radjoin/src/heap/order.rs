//! Ordering policy and priority arithmetic for [`IndexedHeap`].
//!
//! [`IndexedHeap`]: super::IndexedHeap

use serde::{Deserialize, Serialize};

/// Which end of the priority order a heap pops first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeapOrder {
    /// Pop the largest priority first.
    Max,
    /// Pop the smallest priority first.
    Min,
}

impl HeapOrder {
    /// Returns true if `a` belongs strictly closer to the root than `b`.
    ///
    /// Incomparable values (NaN) never take precedence.
    #[inline]
    #[must_use]
    pub fn prefers<P: PartialOrd>(self, a: &P, b: &P) -> bool {
        match self {
            Self::Max => a > b,
            Self::Min => a < b,
        }
    }
}

/// What [`IndexedHeap::decrement`] does when the key is not in the heap.
///
/// [`IndexedHeap::decrement`]: super::IndexedHeap::decrement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingKeyPolicy {
    /// Return [`HeapError::KeyNotFound`](super::HeapError::KeyNotFound).
    #[default]
    Error,
    /// Panic. Strict mode for debugging selection invariants.
    Panic,
}

/// Priorities that can be lowered by exactly one unit.
pub trait UnitStep: Copy {
    /// Returns the value one unit smaller.
    #[must_use]
    fn step_down(self) -> Self;
}

macro_rules! impl_unit_step {
    ($($t:ty => $one:expr),* $(,)?) => {
        $(
            impl UnitStep for $t {
                #[inline]
                fn step_down(self) -> Self {
                    self - $one
                }
            }
        )*
    };
}

impl_unit_step!(i32 => 1, i64 => 1, isize => 1, f32 => 1.0, f64 => 1.0);
