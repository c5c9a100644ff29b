//! Join command implementation.

use std::path::Path;

use clap::Args;
use radjoin::baseline::{linear_scan_join, recall};
use radjoin::{radius_join, BruteForceProbe, JoinConfig, JoinStats, LshConfig, LshIndex, NeighborProbe};
use serde::Serialize;

use crate::commands::load_dataset;
use crate::error::{CliError, Result};
use crate::output::{print_report, InfoRow};
use crate::{IndexKind, OutputFormat};

/// Arguments for the join command.
#[derive(Args, Debug, Clone)]
pub struct JoinArgs {
    /// Distance threshold
    #[arg(short, long)]
    pub radius: f32,

    /// Coverage target for balanced-deficit selection (0 disables it)
    #[arg(short, long, default_value_t = radjoin::join::DEFAULT_COVERAGE_TARGET)]
    pub z: u32,

    /// Candidate index
    #[arg(short, long, value_enum, default_value = "lsh")]
    pub index: IndexKind,

    /// LSH tables
    #[arg(long, default_value_t = LshConfig::new().tables)]
    pub tables: usize,

    /// LSH hashes per table
    #[arg(long, default_value_t = LshConfig::new().hashes_per_table)]
    pub hashes: usize,

    /// LSH bucket width [default: 4 * radius]
    #[arg(long)]
    pub width: Option<f32>,

    /// LSH random seed
    #[arg(long, default_value_t = LshConfig::new().seed)]
    pub seed: u64,

    /// Verification worker threads [default: one per core]
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Print every confirmed pair
    #[arg(long)]
    pub pairs: bool,

    /// Also run the exact scan and report recall
    #[arg(long)]
    pub recall: bool,

    /// Panic on heap invariant violations instead of returning an error
    #[arg(long)]
    pub strict: bool,
}

impl JoinArgs {
    fn join_config(&self) -> JoinConfig {
        let mut config = JoinConfig::new(self.radius)
            .with_z(self.z)
            .with_collect_pairs(self.pairs || self.recall)
            .with_strict_heap(self.strict);
        if let Some(threads) = self.threads {
            config = config.with_threads(threads);
        }
        config
    }

    fn lsh_config(&self) -> LshConfig {
        LshConfig::for_radius(self.radius)
            .with_tables(self.tables)
            .with_hashes_per_table(self.hashes)
            .with_bucket_width(self.width.unwrap_or(self.radius * 4.0))
            .with_seed(self.seed)
    }
}

#[derive(Serialize)]
struct JoinReport<'a> {
    points: usize,
    dimension: usize,
    config: &'a JoinConfig,
    lsh: Option<LshConfig>,
    confirmed_pairs: u64,
    directed_confirmations: u64,
    seeds: usize,
    recall: Option<f64>,
    stats: &'a JoinStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pairs: Option<&'a [(u32, u32)]>,
}

/// Run the join command.
pub fn run(path: Option<&Path>, args: &JoinArgs, format: OutputFormat) -> Result<()> {
    if !(args.radius.is_finite() && args.radius > 0.0) {
        return Err(CliError::InvalidInput(format!("radius must be positive, got {}", args.radius)));
    }
    let ds = load_dataset(path)?;
    let config = args.join_config();

    let (index, lsh): (Box<dyn NeighborProbe>, Option<LshConfig>) = match args.index {
        IndexKind::Lsh => {
            let lsh = args.lsh_config();
            (Box::new(LshIndex::build(&ds, lsh.clone())?), Some(lsh))
        }
        IndexKind::Brute => (Box::new(BruteForceProbe::new(&ds)), None),
    };

    let output = radius_join(&ds, &index, &config)?;
    let found = output.pairs.as_deref().unwrap_or_default();
    let recall = if args.recall {
        let truth = linear_scan_join(&ds, args.radius)?;
        Some(recall(found, &truth))
    } else {
        None
    };

    let stats = &output.stats;
    let mut rows = vec![
        InfoRow::new("Points", ds.len()),
        InfoRow::new("Dimension", ds.dimension()),
        InfoRow::new("Radius", args.radius),
        InfoRow::new("Coverage Target", args.z),
        InfoRow::new("Confirmed Pairs", output.confirmed_pairs),
        InfoRow::new("Seeds", output.seeds.len()),
        InfoRow::new("Coverage Seeds", stats.coverage_seeds),
        InfoRow::new("Deficit Seeds", stats.deficit_seeds),
        InfoRow::new("Below Target", stats.unresolved_deficits),
        InfoRow::new("Distance Evaluations", stats.distance_evaluations()),
    ];
    if let Some(ratio) = stats.work_ratio() {
        rows.push(InfoRow::new("Work Ratio", format!("{ratio:.4}")));
    }
    if let Some(recall) = recall {
        rows.push(InfoRow::new("Recall", format!("{recall:.4}")));
    }

    let pairs = args.pairs.then_some(found);
    let report = JoinReport {
        points: ds.len(),
        dimension: ds.dimension(),
        config: &config,
        lsh,
        confirmed_pairs: output.confirmed_pairs,
        directed_confirmations: output.directed_confirmations(),
        seeds: output.seeds.len(),
        recall,
        stats,
        pairs,
    };
    print_report(format, rows, pairs, &report)
}
