//! Exact linear-scan join and recall measurement.
//!
//! The scan tests all `n(n-1)/2` pairs and is the ground truth the
//! approximate join is measured against.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::info;

use crate::dataset::Dataset;
use crate::distance::RadiusCheck;
use crate::error::{JoinError, JoinResult};

/// Every pair `(a, b)` with `a < b` and `distance(a, b) <= radius`, sorted.
///
/// Rows are scanned in parallel.
///
/// # Errors
///
/// Returns [`JoinError::InvalidConfig`] if `radius` is not positive and
/// finite or the dataset exceeds the `u32` id space.
pub fn linear_scan_join(dataset: &Dataset, radius: f32) -> JoinResult<Vec<(u32, u32)>> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(JoinError::InvalidConfig(format!(
            "radius must be positive and finite, got {radius}"
        )));
    }
    let len = u32::try_from(dataset.len()).map_err(|_| {
        JoinError::InvalidConfig(format!("{} points exceed the u32 id space", dataset.len()))
    })?;
    let check = RadiusCheck::new(radius);

    let pairs: Vec<(u32, u32)> = (0..len)
        .into_par_iter()
        .flat_map_iter(|a| {
            let row_a = dataset.row(a as usize);
            (a + 1..len)
                .filter(move |&b| check.contains(row_a, dataset.row(b as usize)))
                .map(move |b| (a, b))
        })
        .collect();

    info!(points = len, pairs = pairs.len(), "linear scan finished");
    Ok(pairs)
}

/// Fraction of `truth` present in `found`.
///
/// Pairs are unordered; `(a, b)` and `(b, a)` are the same pair. An empty
/// `truth` has recall 1.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn recall(found: &[(u32, u32)], truth: &[(u32, u32)]) -> f64 {
    let normalize = |&(a, b): &(u32, u32)| if a <= b { (a, b) } else { (b, a) };
    let truth: HashSet<(u32, u32)> = truth.iter().map(normalize).collect();
    if truth.is_empty() {
        return 1.0;
    }
    let found: HashSet<(u32, u32)> = found.iter().map(normalize).collect();
    truth.intersection(&found).count() as f64 / truth.len() as f64
}
