//! Per-join state.

use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::config::JoinConfig;
use super::stats::JoinStats;
use super::verify::{Verification, VerificationFilter};
use super::JoinOutput;
use crate::candidates::CandidateModel;
use crate::dataset::Dataset;
use crate::distance::RadiusCheck;
use crate::error::{JoinError, JoinResult};

/// Selection state of a point.
///
/// Colors only move forward: `Unvisited -> Covered -> Selected` or
/// `Unvisited -> Selected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Not yet reached by any seed.
    #[default]
    Unvisited = 0,
    /// Confirmed as a neighbor of some seed.
    Covered = 1,
    /// Chosen as a seed.
    Selected = 2,
}

#[inline]
pub(super) fn promote(colors: &mut [Color], p: usize, to: Color) {
    debug_assert!(colors[p] < to, "color of point {p} would move from {:?} to {to:?}", colors[p]);
    colors[p] = to;
}

/// State owned by one radius join.
///
/// A session is created from a dataset and its candidate model, then driven
/// through [`select_max_coverage`](Self::select_max_coverage),
/// [`select_balanced_deficit`](Self::select_balanced_deficit) and
/// [`verify`](Self::verify), or all three at once with [`run`](Self::run).
/// The phases can be driven one at a time to inspect intermediate state.
#[derive(Debug)]
pub struct RadiusJoin<'a> {
    pub(super) dataset: &'a Dataset,
    pub(super) candidates: CandidateModel,
    pub(super) config: JoinConfig,
    pub(super) check: RadiusCheck,
    pub(super) color: Vec<Color>,
    pub(super) cov_freq: Vec<u32>,
    pub(super) seeds: Vec<u32>,
    /// Neighbor list of every point; empty unless the point is a seed.
    pub(super) neighbors: Vec<Vec<u32>>,
    pub(super) stats: JoinStats,
}

impl<'a> RadiusJoin<'a> {
    /// Create a session.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::InvalidConfig`] if `config` is invalid or the
    /// candidate model does not cover exactly the points of `dataset`.
    pub fn new(dataset: &'a Dataset, candidates: CandidateModel, config: JoinConfig) -> JoinResult<Self> {
        config.validate()?;
        if candidates.len() != dataset.len() {
            return Err(JoinError::InvalidConfig(format!(
                "candidate model has {} points, dataset has {}",
                candidates.len(),
                dataset.len()
            )));
        }

        let n = dataset.len();
        let stats = JoinStats {
            points: n,
            candidates: candidates.total_candidates(),
            ..JoinStats::default()
        };
        Ok(Self {
            dataset,
            check: RadiusCheck::new(config.radius),
            candidates,
            config,
            color: vec![Color::Unvisited; n],
            cov_freq: vec![0; n],
            seeds: Vec::new(),
            neighbors: vec![Vec::new(); n],
            stats,
        })
    }

    /// The configuration of this join.
    #[must_use]
    pub const fn config(&self) -> &JoinConfig {
        &self.config
    }

    /// The candidate model the join runs over.
    #[must_use]
    pub const fn candidates(&self) -> &CandidateModel {
        &self.candidates
    }

    /// Current color of point `p`.
    #[must_use]
    pub fn color(&self, p: usize) -> Color {
        self.color[p]
    }

    /// Current colors of all points.
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.color
    }

    /// Number of times point `p` has been confirmed as a seed's neighbor.
    #[must_use]
    pub fn cov_freq(&self, p: usize) -> u32 {
        self.cov_freq[p]
    }

    /// Seeds in selection order, or ascending once selection has finished.
    #[must_use]
    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }

    /// Confirmed neighbors of point `u`. Empty unless `u` is a seed.
    #[must_use]
    pub fn neighbors(&self, u: usize) -> &[u32] {
        &self.neighbors[u]
    }

    /// Counters collected so far.
    #[must_use]
    pub const fn stats(&self) -> &JoinStats {
        &self.stats
    }

    /// Sort the seeds and every seed's neighbor list ascending.
    ///
    /// Verification enumerates pairs in list order, so it relies on this.
    pub fn sort_selection(&mut self) {
        self.seeds.sort_unstable();
        for &u in &self.seeds {
            self.neighbors[u as usize].sort_unstable();
        }
    }

    /// Test every pair of points that share a seed.
    ///
    /// Runs on a dedicated pool when `config.threads` is set and on the
    /// global rayon pool otherwise. Each call starts from an empty memo.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::ThreadPool`] if the dedicated pool cannot be
    /// built.
    pub fn verify(&mut self) -> JoinResult<Verification> {
        let lists: Vec<&[u32]> =
            self.seeds.iter().map(|&u| self.neighbors[u as usize].as_slice()).collect();
        let filter =
            VerificationFilter::new(self.dataset, self.check).with_collect_pairs(self.config.collect_pairs);

        let result = match self.config.threads {
            Some(threads) => ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| JoinError::ThreadPool(e.to_string()))?
                .install(|| filter.run(&lists)),
            None => filter.run(&lists),
        };

        self.stats.verification_distance_evaluations = result.distance_evaluations;
        self.stats.memo_hits = result.memo_hits;
        info!(
            confirmed_pairs = result.confirmed_pairs,
            distance_evaluations = result.distance_evaluations,
            memo_hits = result.memo_hits,
            "verification finished"
        );
        Ok(result)
    }

    /// Run both selection phases and verification.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::Heap`] if a selection invariant is broken and
    /// [`JoinError::ThreadPool`] if the verification pool cannot be built.
    pub fn run(mut self) -> JoinResult<JoinOutput> {
        self.select_max_coverage()?;
        self.select_balanced_deficit()?;
        let verification = self.verify()?;
        Ok(self.into_output(verification))
    }

    fn into_output(mut self, verification: Verification) -> JoinOutput {
        self.stats.covered_points = self.color.iter().filter(|&&c| c == Color::Covered).count();
        let neighbors =
            self.seeds.iter().map(|&u| std::mem::take(&mut self.neighbors[u as usize])).collect();
        JoinOutput {
            confirmed_pairs: verification.confirmed_pairs,
            seeds: self.seeds,
            neighbors,
            pairs: self.config.collect_pairs.then_some(verification.pairs),
            stats: self.stats,
        }
    }
}
