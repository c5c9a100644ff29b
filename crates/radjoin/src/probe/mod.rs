//! Candidate generation for the join.
//!
//! The join never assumes anything about a probe result beyond "plausible
//! neighbors worth an exact distance test": candidates may be missing true
//! neighbors, may contain far points and duplicates, and may or may not
//! contain the query point itself. Out-of-range ids are rejected when the
//! candidate model is built.
//!
//! Two implementations ship with the crate:
//!
//! - [`BruteForceProbe`] returns every point (full candidate sets)
//! - [`LshIndex`] hashes points with p-stable Euclidean LSH

mod lsh;

pub use lsh::{LshConfig, LshIndex};

use crate::dataset::Dataset;

/// An approximate near-neighbor index over a fixed dataset.
///
/// The join only counts pairs inside a seed's neighbor list, so a seed pairs
/// with its neighbors only if probing its own coordinates returns its own id.
/// Implementations that drop the query point lose every seed-to-neighbor
/// pair. [`BruteForceProbe`] and [`LshIndex`] always return it.
pub trait NeighborProbe {
    /// Return candidate neighbor ids for `query`.
    ///
    /// No ordering, uniqueness, or recall guarantee is expected. Ids must be
    /// below the dataset length and should include the query point itself.
    fn probe(&self, query: &[f32]) -> Vec<u32>;
}

impl<T: NeighborProbe + ?Sized> NeighborProbe for &T {
    fn probe(&self, query: &[f32]) -> Vec<u32> {
        (**self).probe(query)
    }
}

impl<T: NeighborProbe + ?Sized> NeighborProbe for Box<T> {
    fn probe(&self, query: &[f32]) -> Vec<u32> {
        (**self).probe(query)
    }
}

/// A probe that proposes every point of the dataset, including the query's
/// own id.
#[derive(Debug, Clone, Copy)]
pub struct BruteForceProbe {
    len: u32,
}

impl BruteForceProbe {
    /// Create a probe over all points of `dataset`.
    ///
    /// Datasets larger than `u32::MAX` points are clamped.
    #[must_use]
    pub fn new(dataset: &Dataset) -> Self {
        Self { len: u32::try_from(dataset.len()).unwrap_or(u32::MAX) }
    }
}

impl NeighborProbe for BruteForceProbe {
    fn probe(&self, _query: &[f32]) -> Vec<u32> {
        (0..self.len).collect()
    }
}
