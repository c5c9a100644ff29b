//! Forward and reverse candidate adjacency.
//!
//! The candidate model is built once per join from the probe results of
//! every point and is read-only afterwards:
//!
//! - `forward(i)`: the ids the index proposed for point `i`
//! - `reverse(j)`: every `i` whose forward list contains `j`
//!
//! Forward lists are sorted and de-duplicated on construction, so each
//! `(i, j)` candidate relation appears exactly once in each direction.

use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{JoinError, JoinResult};
use crate::probe::NeighborProbe;

/// Per-point candidate lists in both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateModel {
    forward: Vec<Vec<u32>>,
    reverse: Vec<Vec<u32>>,
}

impl CandidateModel {
    /// Probe every point of `dataset` and invert the results.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::IndexContract`] if the index returns an id
    /// outside the dataset.
    pub fn build<P>(dataset: &Dataset, index: &P) -> JoinResult<Self>
    where
        P: NeighborProbe + ?Sized,
    {
        let lists = (0..dataset.len()).map(|i| index.probe(dataset.row(i))).collect();
        Self::from_lists(dataset.len(), lists)
    }

    /// Build the model from precomputed forward lists, one per point.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::IndexContract`] if any id is `>= len`, and
    /// [`JoinError::InvalidConfig`] if `lists.len() != len`.
    pub fn from_lists(len: usize, mut lists: Vec<Vec<u32>>) -> JoinResult<Self> {
        if lists.len() != len {
            return Err(JoinError::InvalidConfig(format!(
                "expected {len} candidate lists, got {}",
                lists.len()
            )));
        }

        if u32::try_from(len).is_err() {
            return Err(JoinError::InvalidConfig(format!("{len} points exceed the u32 id space")));
        }

        let mut reverse: Vec<Vec<u32>> = vec![Vec::new(); len];
        for (query_id, (query, list)) in (0u32..).zip(lists.iter_mut().enumerate()) {
            list.sort_unstable();
            list.dedup();
            if let Some(&id) = list.last() {
                if id as usize >= len {
                    return Err(JoinError::IndexContract { query, id, len });
                }
            }
            for &id in list.iter() {
                reverse[id as usize].push(query_id);
            }
        }

        let model = Self { forward: lists, reverse };
        debug!(
            points = len,
            candidates = model.total_candidates(),
            "built candidate model"
        );
        Ok(model)
    }

    /// Number of points.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Check if the model covers no points.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Candidates proposed for point `i`, ascending.
    #[inline]
    #[must_use]
    pub fn forward(&self, i: usize) -> &[u32] {
        &self.forward[i]
    }

    /// Points whose candidate lists contain `j`, ascending.
    #[inline]
    #[must_use]
    pub fn reverse(&self, j: usize) -> &[u32] {
        &self.reverse[j]
    }

    /// Total number of forward candidate relations.
    #[must_use]
    pub fn total_candidates(&self) -> usize {
        self.forward.iter().map(Vec::len).sum()
    }
}
