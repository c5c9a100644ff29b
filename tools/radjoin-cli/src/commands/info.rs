//! Info command implementation.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::commands::load_dataset;
use crate::error::{CliError, Result};
use crate::output::{print_report, InfoRow};
use crate::OutputFormat;

#[derive(Serialize)]
struct DatasetInfo {
    path: String,
    points: usize,
    dimension: usize,
    file_size: u64,
}

/// Run the info command - displays the dataset header.
pub fn run(path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let path = path.ok_or(CliError::NoDatasetSpecified)?;
    let ds = load_dataset(Some(path))?;

    let info = DatasetInfo {
        path: path.display().to_string(),
        points: ds.len(),
        dimension: ds.dimension(),
        file_size: fs::metadata(path)?.len(),
    };
    let rows = vec![
        InfoRow::new("Path", &info.path),
        InfoRow::new("Points", info.points),
        InfoRow::new("Dimension", info.dimension),
        InfoRow::new("File Size", info.file_size),
    ];
    print_report(format, rows, None, &info)
}
