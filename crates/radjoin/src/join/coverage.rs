//! Greedy seed selection.
//!
//! Selection runs in two phases over the same session state.
//!
//! **Maximum coverage.** Every point starts in a max-heap keyed by the number
//! of its candidates not yet reached. The point with the most is selected,
//! its candidates are tested exactly, and the ones within the radius become
//! covered. Each point that leaves `Unvisited` lowers the key of every
//! unvisited point that lists it as a candidate by one. Entries for points
//! covered as a side effect stay in the heap and are skipped when popped.
//!
//! **Balanced deficit.** Covered points confirmed fewer than `z` times are
//! scored by the total squared deviation `Σ (cov_freq - z)²` that selecting
//! them would leave, assuming each of their under-target candidates gains one
//! confirmation. The lowest score is selected, then every remaining eligible
//! point is rescored.

use tracing::{debug, info, warn};

use super::session::{promote, Color, RadiusJoin};
use crate::error::{JoinError, JoinResult};
use crate::heap::IndexedHeap;

impl RadiusJoin<'_> {
    /// Run maximum-coverage selection. Returns the number of seeds chosen.
    ///
    /// Afterwards every point is either `Covered` or `Selected`.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::Heap`](crate::error::JoinError::Heap) if a
    /// decrement targets a point that is no longer queued, which means the
    /// candidate model broke the selection invariants.
    #[allow(clippy::cast_possible_wrap)]
    pub fn select_max_coverage(&mut self) -> JoinResult<usize> {
        let n = self.candidates.len();
        let dataset = self.dataset;
        let mut heap: IndexedHeap<u32, i64> =
            IndexedHeap::max_heap(n).with_missing_key_policy(self.config.missing_key_policy);
        for (id, i) in (0u32..).zip(0..n) {
            heap.insert(id, self.candidates.forward(i).len() as i64)?;
        }

        let mut selected = 0;
        let mut evaluations = 0_u64;
        while let Some((u, _)) = heap.pop() {
            let ui = u as usize;
            if self.color[ui] != Color::Unvisited {
                self.stats.stale_pops += 1;
                continue;
            }
            promote(&mut self.color, ui, Color::Selected);
            for &v in self.candidates.reverse(ui) {
                if self.color[v as usize] == Color::Unvisited {
                    heap.decrement(v)?;
                }
            }
            self.seeds.push(u);
            selected += 1;

            let row_u = dataset.row(ui);
            for &v in self.candidates.forward(ui) {
                let vi = v as usize;
                evaluations += 1;
                if !self.check.contains(row_u, dataset.row(vi)) {
                    continue;
                }
                self.neighbors[ui].push(v);
                self.cov_freq[vi] += 1;
                if self.color[vi] == Color::Unvisited {
                    promote(&mut self.color, vi, Color::Covered);
                    for &w in self.candidates.reverse(vi) {
                        if self.color[w as usize] == Color::Unvisited {
                            heap.decrement(w)?;
                        }
                    }
                }
            }
        }

        self.stats.coverage_seeds += selected;
        self.stats.selection_distance_evaluations += evaluations;
        info!(seeds = selected, distance_evaluations = evaluations, "maximum-coverage selection finished");
        Ok(selected)
    }

    /// Run balanced-deficit selection. Returns the number of seeds added.
    ///
    /// Ends by sorting the seeds and their neighbor lists ascending. With
    /// `z = 0` no point is eligible and only the sort happens.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::Heap`](crate::error::JoinError::Heap) if the
    /// heap rejects an update.
    pub fn select_balanced_deficit(&mut self) -> JoinResult<usize> {
        let z = self.config.z;
        let dataset = self.dataset;
        let mut heap: IndexedHeap<u32, i64> = IndexedHeap::min_heap(self.candidates.len())
            .with_missing_key_policy(self.config.missing_key_policy);
        self.rescore_deficits(&mut heap)?;
        debug!(eligible = heap.len(), z, "balanced-deficit selection started");

        let mut selected = 0;
        let mut evaluations = 0_u64;
        while let Some((u, _)) = heap.pop() {
            let ui = u as usize;
            if self.cov_freq[ui] >= z {
                self.stats.stale_pops += 1;
                continue;
            }
            promote(&mut self.color, ui, Color::Selected);
            self.seeds.push(u);
            selected += 1;

            let row_u = dataset.row(ui);
            for &v in self.candidates.forward(ui) {
                evaluations += 1;
                if self.check.contains(row_u, dataset.row(v as usize)) {
                    self.neighbors[ui].push(v);
                    self.cov_freq[v as usize] += 1;
                }
            }
            self.rescore_deficits(&mut heap)?;
        }

        let unresolved = self.cov_freq.iter().filter(|&&c| c < z).count();
        self.stats.deficit_seeds += selected;
        self.stats.selection_distance_evaluations += evaluations;
        self.stats.unresolved_deficits = unresolved;
        self.sort_selection();

        info!(seeds = selected, distance_evaluations = evaluations, "balanced-deficit selection finished");
        if unresolved > 0 {
            warn!(points = unresolved, z, "points left below the coverage target");
        }
        Ok(selected)
    }

    /// A covered point confirmed fewer than `z` times.
    fn is_deficient(&self, p: usize) -> bool {
        self.color[p] == Color::Covered && self.cov_freq[p] < self.config.z
    }

    /// Set the score of every deficient point, inserting those not queued.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::InvalidConfig`] if a score does not fit in `i64`.
    fn rescore_deficits(&self, heap: &mut IndexedHeap<u32, i64>) -> JoinResult<()> {
        let z = i64::from(self.config.z);
        let base = squared_deviation(&self.cov_freq, z).ok_or_else(|| score_overflow(z))?;

        for (id, p) in (0u32..).zip(0..self.color.len()) {
            if !self.is_deficient(p) {
                continue;
            }
            // Each term is in (-2z, 0), so the sum is bounded by n * 2z.
            let delta: i64 = self
                .candidates
                .forward(p)
                .iter()
                .map(|&v| i64::from(self.cov_freq[v as usize]))
                .filter(|&c| c < z)
                .map(|c| 2 * (c - z) + 1)
                .sum();
            let score = base.checked_add(delta).ok_or_else(|| score_overflow(z))?;
            heap.set_priority(id, score)?;
        }
        Ok(())
    }
}

/// `Σ (c - z)²` over all coverage frequencies, or `None` on overflow.
fn squared_deviation(cov_freq: &[u32], z: i64) -> Option<i64> {
    cov_freq.iter().try_fold(0_i64, |acc, &c| {
        let d = i64::from(c) - z;
        acc.checked_add(d.checked_mul(d)?)
    })
}

fn score_overflow(z: i64) -> JoinError {
    JoinError::InvalidConfig(format!("deficit score overflows i64 with z = {z}"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::candidates::CandidateModel;
    use crate::dataset::Dataset;
    use crate::join::JoinConfig;
    use crate::probe::BruteForceProbe;

    fn brute(ds: &Dataset, config: JoinConfig) -> RadiusJoin<'_> {
        let model = CandidateModel::build(ds, &BruteForceProbe::new(ds)).unwrap();
        RadiusJoin::new(ds, model, config).unwrap()
    }

    #[test]
    fn test_max_coverage_colors_everything() {
        let ds = Dataset::from_rows(&[[0.0], [0.1], [10.0], [10.1], [20.0]]).unwrap();
        let mut join = brute(&ds, JoinConfig::new(1.0));
        let seeds = join.select_max_coverage().unwrap();

        assert_eq!(seeds, 3);
        assert!(join.colors().iter().all(|&c| c != Color::Unvisited));
        assert_eq!(join.stats().selection_distance_evaluations, 15);
        // Each seed confirms itself.
        for &u in join.seeds() {
            assert!(join.neighbors(u as usize).contains(&u));
        }
    }

    #[test]
    fn test_max_coverage_prefers_largest_candidate_list() {
        // Point 1 lists everyone; the others list only themselves and 1.
        let ds = Dataset::from_rows(&[[0.0], [1.0], [2.0], [3.0]]).unwrap();
        let model = CandidateModel::from_lists(
            4,
            vec![vec![0, 1], vec![0, 1, 2, 3], vec![1, 2], vec![1, 3]],
        )
        .unwrap();
        let mut join = RadiusJoin::new(&ds, model, JoinConfig::new(2.5)).unwrap();
        join.select_max_coverage().unwrap();

        assert_eq!(join.seeds(), &[1]);
        assert_eq!(join.neighbors(1), &[0, 1, 2, 3]);
        assert_eq!(join.stats().stale_pops, 3);
    }

    #[test]
    fn test_false_positives_not_covered() {
        // The probe proposes a far point that fails the distance test.
        let ds = Dataset::from_rows(&[[0.0], [100.0]]).unwrap();
        let model = CandidateModel::from_lists(2, vec![vec![0, 1], vec![1]]).unwrap();
        let mut join = RadiusJoin::new(&ds, model, JoinConfig::new(1.0)).unwrap();
        join.select_max_coverage().unwrap();

        assert_eq!(join.seeds(), &[0, 1]);
        assert_eq!(join.neighbors(0), &[0]);
        assert_eq!(join.cov_freq(1), 1);
    }

    #[test]
    fn test_deficit_phase_raises_coverage() {
        let ds = Dataset::from_rows(&[[0.0], [0.5], [1.0]]).unwrap();
        let mut join = brute(&ds, JoinConfig::new(2.0).with_z(2));
        assert_eq!(join.select_max_coverage().unwrap(), 1);
        let added = join.select_balanced_deficit().unwrap();

        // The first deficit seed confirms both remaining points a second time.
        assert_eq!(added, 1);
        assert_eq!(join.stats().unresolved_deficits, 0);
        for p in 0..3 {
            if join.color(p) == Color::Covered {
                assert!(join.cov_freq(p) >= 2);
            }
        }
        assert!(join.seeds().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_deficit_phase_disabled_with_zero_target() {
        let ds = Dataset::from_rows(&[[0.0], [0.5], [1.0]]).unwrap();
        let mut join = brute(&ds, JoinConfig::new(2.0).with_z(0));
        join.select_max_coverage().unwrap();
        assert_eq!(join.select_balanced_deficit().unwrap(), 0);
        assert_eq!(join.stats().deficit_seeds, 0);
    }

    #[test]
    fn test_unresolved_deficit_counted() {
        // Point 1 is covered only by 0 and has no candidates of its own.
        let ds = Dataset::from_rows(&[[0.0], [0.5]]).unwrap();
        let model = CandidateModel::from_lists(2, vec![vec![0, 1], vec![]]).unwrap();
        let mut join = RadiusJoin::new(&ds, model, JoinConfig::new(1.0).with_z(3)).unwrap();
        join.select_max_coverage().unwrap();
        assert_eq!(join.color(1), Color::Covered);

        // Selecting 1 confirms nothing, so both points stay below target.
        assert_eq!(join.select_balanced_deficit().unwrap(), 1);
        assert_eq!(join.color(1), Color::Selected);
        assert_eq!(join.cov_freq(1), 1);
        assert_eq!(join.stats().unresolved_deficits, 2);
    }

    #[test]
    fn test_largest_target_scores_without_overflow() {
        let ds = Dataset::from_rows(&[[0.0], [0.5], [1.0]]).unwrap();
        let mut join = brute(&ds, JoinConfig::new(2.0).with_z(crate::join::MAX_COVERAGE_TARGET));
        join.select_max_coverage().unwrap();
        assert_eq!(join.select_balanced_deficit().unwrap(), 2);
        assert_eq!(join.stats().unresolved_deficits, 3);
    }

    #[test]
    fn test_squared_deviation_overflow() {
        assert_eq!(squared_deviation(&[0, 1, 4], 2), Some(4 + 1 + 4));
        assert_eq!(squared_deviation(&[], 7), Some(0));
        // (2^32)^2 alone exceeds i64.
        assert_eq!(squared_deviation(&[0], 1 << 32), None);
        // Each square fits but the sum does not.
        assert_eq!(squared_deviation(&[0, 0], 3_037_000_499), None);
    }
}
