//! The radius self-join.
//!
//! A join runs in three stages over one [`RadiusJoin`] session:
//!
//! 1. **Maximum-coverage selection** picks seeds until every point is a seed
//!    or a confirmed neighbor of one.
//! 2. **Balanced-deficit selection** promotes covered points confirmed fewer
//!    than `z` times.
//! 3. **Verification** tests, in parallel, every pair of points that share a
//!    seed.
//!
//! Only pairs found in stage 3 are counted, so a seed's own list must contain
//! the seed for seed-to-neighbor pairs to be reported. Probes that return the
//! query point itself (as [`BruteForceProbe`](crate::probe::BruteForceProbe)
//! and [`LshIndex`](crate::probe::LshIndex) do) satisfy this.
//!
//! # Example
//!
//! ```
//! use radjoin::dataset::Dataset;
//! use radjoin::join::{radius_join, JoinConfig};
//! use radjoin::probe::BruteForceProbe;
//!
//! let ds = Dataset::from_rows(&[[0.0, 0.0], [0.1, 0.0], [10.0, 0.0], [10.1, 0.0]])?;
//! let output = radius_join(&ds, &BruteForceProbe::new(&ds), &JoinConfig::new(1.0))?;
//!
//! assert_eq!(output.confirmed_pairs, 2);
//! assert_eq!(output.directed_confirmations(), 4);
//! # Ok::<(), radjoin::error::JoinError>(())
//! ```

mod config;
mod coverage;
mod session;
mod stats;
mod verify;

pub use config::{JoinConfig, DEFAULT_COVERAGE_TARGET, MAX_COVERAGE_TARGET};
pub use session::{Color, RadiusJoin};
pub use stats::JoinStats;
pub use verify::{Verification, VerificationFilter};

use serde::{Deserialize, Serialize};
use tracing::info_span;

use crate::candidates::CandidateModel;
use crate::dataset::Dataset;
use crate::error::JoinResult;
use crate::probe::NeighborProbe;

/// Result of a radius join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinOutput {
    /// Unordered pairs confirmed within the radius.
    pub confirmed_pairs: u64,
    /// Seeds, ascending.
    pub seeds: Vec<u32>,
    /// Confirmed neighbors of each seed, ascending; `neighbors[i]` belongs
    /// to `seeds[i]`.
    pub neighbors: Vec<Vec<u32>>,
    /// Confirmed pairs `(a, b)` with `a < b`, when collection was enabled.
    pub pairs: Option<Vec<(u32, u32)>>,
    /// Work counters.
    pub stats: JoinStats,
}

impl JoinOutput {
    /// Confirmations counted once per direction, `2 * confirmed_pairs`.
    #[must_use]
    pub const fn directed_confirmations(&self) -> u64 {
        self.confirmed_pairs * 2
    }
}

/// Find the pairs of `dataset` within `config.radius` of each other.
///
/// Probes every point against `index`, then runs selection and verification.
///
/// # Errors
///
/// Returns [`JoinError::InvalidConfig`](crate::error::JoinError::InvalidConfig)
/// for a bad configuration,
/// [`JoinError::IndexContract`](crate::error::JoinError::IndexContract) if
/// the index returns ids outside the dataset, and an internal error if a
/// selection invariant breaks.
pub fn radius_join<P>(dataset: &Dataset, index: &P, config: &JoinConfig) -> JoinResult<JoinOutput>
where
    P: NeighborProbe + ?Sized,
{
    let span = info_span!("radius_join", points = dataset.len(), radius = config.radius, z = config.z);
    let _guard = span.enter();

    config.validate()?;
    let candidates = CandidateModel::build(dataset, index)?;
    RadiusJoin::new(dataset, candidates, config.clone())?.run()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::error::JoinError;
    use crate::probe::BruteForceProbe;

    #[test]
    fn test_empty_dataset() {
        let ds = Dataset::from_flat(3, Vec::new()).unwrap();
        let output = radius_join(&ds, &BruteForceProbe::new(&ds), &JoinConfig::new(1.0)).unwrap();
        assert_eq!(output.confirmed_pairs, 0);
        assert!(output.seeds.is_empty());
        assert_eq!(output.stats.work_ratio(), None);
    }

    #[test]
    fn test_single_point() {
        let ds = Dataset::from_rows(&[[1.0, 2.0]]).unwrap();
        let output = radius_join(&ds, &BruteForceProbe::new(&ds), &JoinConfig::new(1.0)).unwrap();
        assert_eq!(output.seeds, vec![0]);
        assert_eq!(output.neighbors, vec![vec![0]]);
        assert_eq!(output.confirmed_pairs, 0);
    }

    #[test]
    fn test_invalid_radius_rejected_before_probing() {
        let ds = Dataset::from_rows(&[[0.0]]).unwrap();
        let err = radius_join(&ds, &BruteForceProbe::new(&ds), &JoinConfig::new(0.0)).unwrap_err();
        assert!(matches!(err, JoinError::InvalidConfig(_)));
    }

    #[test]
    fn test_pairs_collected_on_request() {
        let ds = Dataset::from_rows(&[[0.0], [0.5], [5.0]]).unwrap();
        let probe = BruteForceProbe::new(&ds);

        let without = radius_join(&ds, &probe, &JoinConfig::new(1.0)).unwrap();
        assert_eq!(without.pairs, None);

        let with = radius_join(&ds, &probe, &JoinConfig::new(1.0).with_collect_pairs(true)).unwrap();
        assert_eq!(with.pairs, Some(vec![(0, 1)]));
        assert_eq!(with.confirmed_pairs, 1);
    }

    #[test]
    fn test_output_serializes() {
        let ds = Dataset::from_rows(&[[0.0], [0.5]]).unwrap();
        let output = radius_join(&ds, &BruteForceProbe::new(&ds), &JoinConfig::new(1.0)).unwrap();
        let json = serde_json::to_string(&output).unwrap();
        let back: JoinOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, output);
    }
}
