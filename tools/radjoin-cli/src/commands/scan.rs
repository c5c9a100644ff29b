//! Scan command implementation.

use std::path::Path;

use radjoin::baseline::linear_scan_join;
use serde::Serialize;

use crate::commands::load_dataset;
use crate::error::Result;
use crate::output::{print_report, InfoRow};
use crate::OutputFormat;

#[derive(Serialize)]
struct ScanReport<'a> {
    points: usize,
    dimension: usize,
    radius: f32,
    pairs_found: usize,
    distance_evaluations: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pairs: Option<&'a [(u32, u32)]>,
}

/// Run the scan command - the exact join over all pairs.
pub fn run(path: Option<&Path>, radius: f32, print_pairs: bool, format: OutputFormat) -> Result<()> {
    let ds = load_dataset(path)?;
    let found = linear_scan_join(&ds, radius)?;

    let n = ds.len() as u64;
    let evaluations = n * n.saturating_sub(1) / 2;
    let rows = vec![
        InfoRow::new("Points", ds.len()),
        InfoRow::new("Dimension", ds.dimension()),
        InfoRow::new("Radius", radius),
        InfoRow::new("Pairs", found.len()),
        InfoRow::new("Distance Evaluations", evaluations),
    ];

    let pairs = print_pairs.then_some(found.as_slice());
    let report = ScanReport {
        points: ds.len(),
        dimension: ds.dimension(),
        radius,
        pairs_found: found.len(),
        distance_evaluations: evaluations,
        pairs,
    };
    print_report(format, rows, pairs, &report)
}
