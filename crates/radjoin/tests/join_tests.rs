//! End-to-end tests for the radius join.
//!
//! These drive the selection phases one at a time through `RadiusJoin` so
//! intermediate state (colors, coverage frequencies) can be checked, and
//! compare join output against the exact linear scan.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use radjoin::baseline::{linear_scan_join, recall};
use radjoin::join::{radius_join, Color, JoinConfig, RadiusJoin, MAX_COVERAGE_TARGET};
use radjoin::probe::{BruteForceProbe, LshConfig, LshIndex, NeighborProbe};
use radjoin::{CandidateModel, Dataset};

// ============================================================================
// Helpers
// ============================================================================

fn session<'a, P: NeighborProbe>(ds: &'a Dataset, probe: &P, config: JoinConfig) -> RadiusJoin<'a> {
    let model = CandidateModel::build(ds, probe).unwrap();
    RadiusJoin::new(ds, model, config).unwrap()
}

/// `clusters` groups of `per_cluster` points scattered around random centers.
fn clustered(seed: u64, clusters: usize, per_cluster: usize, dim: usize, spread: f32) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(clusters * per_cluster * dim);
    for _ in 0..clusters {
        let center: Vec<f32> = (0..dim).map(|_| rng.gen_range(-50.0..50.0)).collect();
        for _ in 0..per_cluster {
            data.extend(center.iter().map(|c| c + rng.gen_range(-spread..spread)));
        }
    }
    Dataset::from_flat(dim, data).unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_two_separated_pairs() {
    let ds = Dataset::from_rows(&[[0.0, 0.0], [0.1, 0.0], [10.0, 0.0], [10.1, 0.0]]).unwrap();
    let mut join = session(&ds, &BruteForceProbe::new(&ds), JoinConfig::new(1.0));

    join.select_max_coverage().unwrap();
    assert!(join.colors().iter().all(|&c| c != Color::Unvisited));
    join.select_balanced_deficit().unwrap();
    assert!(join.colors().iter().all(|&c| c != Color::Unvisited));

    let verification = join.verify().unwrap();
    assert_eq!(verification.confirmed_pairs, 2);
}

#[test]
fn test_everything_within_radius() {
    let n = 7;
    let rows: Vec<[f32; 3]> = (0..n).map(|i| [i as f32 * 0.1, 1.0, -1.0]).collect();
    let ds = Dataset::from_rows(&rows).unwrap();
    let mut join = session(&ds, &BruteForceProbe::new(&ds), JoinConfig::new(100.0).with_z(1));

    assert_eq!(join.select_max_coverage().unwrap(), 1);
    assert_eq!(join.select_balanced_deficit().unwrap(), 0);
    let seed = join.seeds()[0] as usize;
    assert_eq!(join.neighbors(seed).len(), n);

    let verification = join.verify().unwrap();
    assert_eq!(verification.confirmed_pairs, (n * (n - 1) / 2) as u64);
}

#[test]
fn test_zero_target_matches_first_phase_alone() {
    let ds = clustered(11, 5, 12, 8, 1.0);
    let probe = BruteForceProbe::new(&ds);
    let config = JoinConfig::new(2.0).with_z(0).with_collect_pairs(true);

    let full = radius_join(&ds, &probe, &config).unwrap();

    let mut alone = session(&ds, &probe, config);
    alone.select_max_coverage().unwrap();
    alone.sort_selection();
    let verification = alone.verify().unwrap();

    assert_eq!(full.stats.deficit_seeds, 0);
    assert_eq!(full.seeds, alone.seeds());
    for (seed, list) in full.seeds.iter().zip(&full.neighbors) {
        assert_eq!(list.as_slice(), alone.neighbors(*seed as usize));
    }
    assert_eq!(full.confirmed_pairs, verification.confirmed_pairs);
    assert_eq!(full.pairs, Some(verification.pairs));
}

// ============================================================================
// Output against the exact scan
// ============================================================================

#[test]
fn test_confirmed_pairs_are_true_pairs() {
    let ds = clustered(3, 6, 15, 4, 0.8);
    let radius = 2.0;
    let truth = linear_scan_join(&ds, radius).unwrap();
    let truth_set: HashSet<(u32, u32)> = truth.iter().copied().collect();

    let config = JoinConfig::new(radius).with_collect_pairs(true);
    let output = radius_join(&ds, &BruteForceProbe::new(&ds), &config).unwrap();
    let pairs = output.pairs.unwrap();

    assert_eq!(pairs.len() as u64, output.confirmed_pairs);
    assert!(pairs.iter().all(|p| truth_set.contains(p)));
    assert!(pairs.windows(2).all(|w| w[0] < w[1]));
    assert!(recall(&pairs, &truth) > 0.0);
}

#[test]
fn test_lsh_join_is_precise_and_cheaper() {
    let ds = clustered(5, 8, 25, 12, 0.5);
    let radius = 1.5;
    let truth: HashSet<(u32, u32)> = linear_scan_join(&ds, radius).unwrap().into_iter().collect();

    let index = LshIndex::build(&ds, LshConfig::for_radius(radius).with_tables(12)).unwrap();
    let config = JoinConfig::new(radius).with_collect_pairs(true);
    let output = radius_join(&ds, &index, &config).unwrap();

    assert!(output.pairs.unwrap().iter().all(|p| truth.contains(p)));
    // Far clusters never share a bucket, so the join does less than a full scan.
    let ratio = output.stats.work_ratio().unwrap();
    assert!(ratio < 1.0, "work ratio {ratio}");
}

#[test]
fn test_stats_are_consistent() {
    let ds = clustered(8, 4, 10, 4, 1.0);
    let output = radius_join(&ds, &BruteForceProbe::new(&ds), &JoinConfig::new(1.5)).unwrap();
    let stats = &output.stats;

    assert_eq!(stats.points, ds.len());
    assert_eq!(stats.candidates, ds.len() * ds.len());
    assert_eq!(stats.seeds(), output.seeds.len());
    assert_eq!(stats.covered_points + stats.seeds(), ds.len());
    assert_eq!(output.neighbors.len(), output.seeds.len());
    // Every seed's candidate list is the whole dataset.
    assert_eq!(stats.selection_distance_evaluations, (stats.seeds() * ds.len()) as u64);
}

#[test]
fn test_thread_count_does_not_change_result() {
    let ds = clustered(21, 6, 20, 8, 1.0);
    let probe = BruteForceProbe::new(&ds);
    let config = JoinConfig::new(2.0).with_collect_pairs(true);

    let single = radius_join(&ds, &probe, &config.clone().with_threads(1)).unwrap();
    let many = radius_join(&ds, &probe, &config.with_threads(4)).unwrap();
    assert_eq!(single, many);
}

#[test]
fn test_coverage_target_above_limit_is_rejected() {
    let ds = Dataset::from_rows(&[[0.0], [0.5], [1.0]]).unwrap();
    let probe = BruteForceProbe::new(&ds);

    let err = radius_join(&ds, &probe, &JoinConfig::new(1.0).with_z(u32::MAX)).unwrap_err();
    assert!(err.is_config_error());

    let output = radius_join(&ds, &probe, &JoinConfig::new(1.0).with_z(MAX_COVERAGE_TARGET)).unwrap();
    assert_eq!(output.confirmed_pairs, 3);
}

/// Proposes every point except the one at the query's coordinates.
struct ExcludeSelf<'a>(&'a Dataset);

impl NeighborProbe for ExcludeSelf<'_> {
    fn probe(&self, query: &[f32]) -> Vec<u32> {
        (0u32..).zip(self.0.rows()).filter(|(_, row)| *row != query).map(|(id, _)| id).collect()
    }
}

#[test]
fn test_index_without_self_loses_seed_pairs() {
    let ds = Dataset::from_rows(&[[0.0], [0.5]]).unwrap();
    let config = JoinConfig::new(1.0);

    let with_self = radius_join(&ds, &BruteForceProbe::new(&ds), &config).unwrap();
    assert_eq!(with_self.confirmed_pairs, 1);

    // Every seed list holds only the other point, so no pair is verified.
    let without_self = radius_join(&ds, &ExcludeSelf(&ds), &config).unwrap();
    assert!(without_self.neighbors.iter().all(|list| list.len() == 1));
    assert_eq!(without_self.confirmed_pairs, 0);
}

// ============================================================================
// Properties
// ============================================================================

fn arb_points() -> impl Strategy<Value = Vec<[f32; 2]>> {
    prop::collection::vec([-5.0_f32..5.0, -5.0_f32..5.0], 1..40)
}

proptest! {
    #[test]
    fn colors_only_move_forward(points in arb_points(), radius in 0.5_f32..4.0, z in 0_u32..4) {
        let ds = Dataset::from_rows(&points).unwrap();
        let mut join = session(&ds, &BruteForceProbe::new(&ds), JoinConfig::new(radius).with_z(z));

        join.select_max_coverage().unwrap();
        let after_first: Vec<Color> = join.colors().to_vec();
        prop_assert!(after_first.iter().all(|&c| c != Color::Unvisited));

        join.select_balanced_deficit().unwrap();
        for (before, after) in after_first.iter().zip(join.colors()) {
            prop_assert!(after >= before);
        }
    }

    #[test]
    fn covered_points_reach_target(
        points in arb_points(),
        radius in 0.5_f32..4.0,
        z in 1_u32..4,
        keep in prop::collection::vec(any::<bool>(), 40 * 40),
    ) {
        let ds = Dataset::from_rows(&points).unwrap();
        let n = ds.len();
        // A lossy index: each point keeps a random subset of all ids.
        let lists = (0..n)
            .map(|i| (0..n).filter(|&j| keep[i * 40 + j]).map(|j| j as u32).collect())
            .collect();
        let model = CandidateModel::from_lists(n, lists).unwrap();
        let mut join = RadiusJoin::new(&ds, model, JoinConfig::new(radius).with_z(z)).unwrap();

        join.select_max_coverage().unwrap();
        join.select_balanced_deficit().unwrap();

        let seeds: HashSet<u32> = join.seeds().iter().copied().collect();
        prop_assert_eq!(seeds.len(), join.seeds().len());
        for p in 0..n {
            match join.color(p) {
                Color::Covered => prop_assert!(join.cov_freq(p) >= z),
                Color::Selected => prop_assert!(seeds.contains(&(p as u32))),
                Color::Unvisited => prop_assert!(false, "point {} left unvisited", p),
            }
        }
    }
}
