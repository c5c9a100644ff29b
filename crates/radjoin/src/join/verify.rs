//! Parallel verification of pairs that share a seed.
//!
//! Two points that are both within the radius of the same seed are likely,
//! but not certain, to be within the radius of each other. For every seed
//! neighbor list, every unordered pair `(a, b)` with `a < b` is tested once.
//!
//! Lists are processed in parallel. A pair can show up in several lists, so
//! each point owns a memo of partners already tested, guarded by its own
//! lock. Claiming a pair (check and insert) happens under that lock, which
//! makes the count depend only on the set of distinct pairs, never on which
//! seed or thread reached a pair first.

use std::collections::HashSet;

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::dataset::Dataset;
use crate::distance::RadiusCheck;

/// Result of a verification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verification {
    /// Unordered pairs confirmed within the radius.
    pub confirmed_pairs: u64,
    /// Exact distance tests performed.
    pub distance_evaluations: u64,
    /// Pairs skipped because they were already tested.
    pub memo_hits: u64,
    /// Confirmed pairs `(a, b)` with `a < b`, sorted, when collected.
    pub pairs: Vec<(u32, u32)>,
}

impl Verification {
    fn merge(mut self, other: Self) -> Self {
        self.confirmed_pairs += other.confirmed_pairs;
        self.distance_evaluations += other.distance_evaluations;
        self.memo_hits += other.memo_hits;
        self.pairs.extend(other.pairs);
        self
    }
}

/// Per-point sets of partners already tested.
#[derive(Debug)]
struct PairMemo {
    partners: Vec<Mutex<HashSet<u32>>>,
}

impl PairMemo {
    fn new(len: usize) -> Self {
        Self { partners: (0..len).map(|_| Mutex::new(HashSet::new())).collect() }
    }

    /// Record `(a, b)` as tested. Returns false if it already was.
    #[inline]
    fn claim(&self, a: u32, b: u32) -> bool {
        self.partners[a as usize].lock().insert(b)
    }

    fn len(&self) -> usize {
        self.partners.iter().map(|p| p.lock().len()).sum()
    }
}

/// Verification pass over seed neighbor lists, with a memo shared across
/// calls to [`run`](Self::run).
#[derive(Debug)]
pub struct VerificationFilter<'a> {
    dataset: &'a Dataset,
    check: RadiusCheck,
    memo: PairMemo,
    collect_pairs: bool,
}

impl<'a> VerificationFilter<'a> {
    /// Create a filter with an empty memo.
    #[must_use]
    pub fn new(dataset: &'a Dataset, check: RadiusCheck) -> Self {
        Self { dataset, check, memo: PairMemo::new(dataset.len()), collect_pairs: false }
    }

    /// Keep confirmed pairs, not just the count.
    #[must_use]
    pub const fn with_collect_pairs(mut self, collect: bool) -> Self {
        self.collect_pairs = collect;
        self
    }

    /// Number of distinct pairs tested so far.
    #[must_use]
    pub fn tested_pairs(&self) -> usize {
        self.memo.len()
    }

    /// Test every unordered pair drawn from each list.
    ///
    /// Lists must be sorted ascending with ids `< dataset.len()`; lists with
    /// fewer than two entries are skipped. Runs on the current rayon pool.
    pub fn run<L>(&self, lists: &[L]) -> Verification
    where
        L: AsRef<[u32]> + Sync,
    {
        let mut result = lists
            .par_iter()
            .map(|list| self.verify_list(list.as_ref()))
            .reduce(Verification::default, Verification::merge);
        result.pairs.sort_unstable();
        result
    }

    fn verify_list(&self, list: &[u32]) -> Verification {
        let mut local = Verification::default();
        if list.len() < 2 {
            return local;
        }

        for (i, &a) in list.iter().enumerate() {
            let row_a = self.dataset.row(a as usize);
            for &b in &list[i + 1..] {
                debug_assert!(a < b, "neighbor lists must be sorted and unique");
                if !self.memo.claim(a, b) {
                    local.memo_hits += 1;
                    continue;
                }
                local.distance_evaluations += 1;
                if self.check.contains(row_a, self.dataset.row(b as usize)) {
                    local.confirmed_pairs += 1;
                    if self.collect_pairs {
                        local.pairs.push((a, b));
                    }
                }
            }
        }
        local
    }
}
