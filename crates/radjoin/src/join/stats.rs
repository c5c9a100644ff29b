//! Counters collected during a join.

use serde::{Deserialize, Serialize};

/// Work and outcome counters for one join.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStats {
    /// Points in the dataset.
    pub points: usize,
    /// Forward candidate relations after de-duplication.
    pub candidates: usize,
    /// Seeds chosen by maximum-coverage selection.
    pub coverage_seeds: usize,
    /// Seeds added by balanced-deficit selection.
    pub deficit_seeds: usize,
    /// Points covered (reached as a neighbor) but never selected.
    pub covered_points: usize,
    /// Heap entries popped for points already colored.
    pub stale_pops: usize,
    /// Points still below the coverage target after selection.
    pub unresolved_deficits: usize,
    /// Exact distance tests run during selection.
    pub selection_distance_evaluations: u64,
    /// Exact distance tests run during verification.
    pub verification_distance_evaluations: u64,
    /// Pairs skipped because another seed had already tested them.
    pub memo_hits: u64,
}

impl JoinStats {
    /// Total seeds across both phases.
    #[must_use]
    pub const fn seeds(&self) -> usize {
        self.coverage_seeds + self.deficit_seeds
    }

    /// Total exact distance tests.
    #[must_use]
    pub const fn distance_evaluations(&self) -> u64 {
        self.selection_distance_evaluations + self.verification_distance_evaluations
    }

    /// Fraction of the `n(n-1)/2` all-pairs work actually performed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn work_ratio(&self) -> Option<f64> {
        let n = self.points as f64;
        let all_pairs = n * (n - 1.0) / 2.0;
        (all_pairs > 0.0).then(|| self.distance_evaluations() as f64 / all_pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let stats = JoinStats {
            points: 10,
            coverage_seeds: 3,
            deficit_seeds: 2,
            selection_distance_evaluations: 30,
            verification_distance_evaluations: 15,
            ..JoinStats::default()
        };
        assert_eq!(stats.seeds(), 5);
        assert_eq!(stats.distance_evaluations(), 45);
        let ratio = stats.work_ratio().unwrap_or_default();
        assert!((ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_work_ratio_empty() {
        assert_eq!(JoinStats::default().work_ratio(), None);
    }
}
