//! CLI command implementations.

pub mod info;
pub mod join;
pub mod scan;

use std::path::Path;

use radjoin::Dataset;

use crate::error::{CliError, Result};

/// Load the dataset at `path`, which must be given and exist.
pub fn load_dataset(path: Option<&Path>) -> Result<Dataset> {
    let path = path.ok_or(CliError::NoDatasetSpecified)?;
    if !path.exists() {
        return Err(CliError::DatasetNotFound(path.to_path_buf()));
    }
    Ok(Dataset::open(path)?)
}
