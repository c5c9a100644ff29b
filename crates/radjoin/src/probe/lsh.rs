//! p-stable locality-sensitive hashing for Euclidean distance.
//!
//! Each of the `L` tables hashes a point with `K` functions of the form
//!
//! ```text
//! h(p) = floor((a · p + b) / w)
//! ```
//!
//! where `a` has i.i.d. standard normal entries (2-stable) and `b` is uniform
//! in `[0, w)`. Points that agree on all `K` hashes share a bucket. Probing
//! unions the query's bucket across all tables.
//!
//! Larger `w` or more tables raise recall; larger `K` makes buckets more
//! selective. A bucket width of a few times the join radius is a reasonable
//! start.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::NeighborProbe;
use crate::dataset::Dataset;
use crate::error::{JoinError, JoinResult};

/// Configuration parameters for an [`LshIndex`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LshConfig {
    /// Number of hash tables (`L`).
    pub tables: usize,
    /// Number of concatenated hash functions per table (`K`).
    pub hashes_per_table: usize,
    /// Quantization width of each projection (`w`).
    pub bucket_width: f32,
    /// Seed for the random projections.
    pub seed: u64,
}

impl LshConfig {
    /// Create a configuration with default parameters:
    ///
    /// - `tables` = 8
    /// - `hashes_per_table` = 4
    /// - `bucket_width` = 4.0
    /// - `seed` = 42
    #[must_use]
    pub const fn new() -> Self {
        Self { tables: 8, hashes_per_table: 4, bucket_width: 4.0, seed: 42 }
    }

    /// Default parameters with the bucket width set to four radii.
    #[must_use]
    pub fn for_radius(radius: f32) -> Self {
        Self::new().with_bucket_width(radius * 4.0)
    }

    /// Set the number of tables.
    #[must_use]
    pub const fn with_tables(mut self, tables: usize) -> Self {
        self.tables = tables;
        self
    }

    /// Set the number of hashes per table.
    #[must_use]
    pub const fn with_hashes_per_table(mut self, hashes: usize) -> Self {
        self.hashes_per_table = hashes;
        self
    }

    /// Set the bucket width.
    #[must_use]
    pub const fn with_bucket_width(mut self, width: f32) -> Self {
        self.bucket_width = width;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check that all parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::InvalidConfig`] for zero tables or hashes, or a
    /// bucket width that is not a positive finite number.
    pub fn validate(&self) -> JoinResult<()> {
        if self.tables == 0 {
            return Err(JoinError::InvalidConfig("LSH needs at least one table".into()));
        }
        if self.hashes_per_table == 0 {
            return Err(JoinError::InvalidConfig("LSH needs at least one hash per table".into()));
        }
        if !(self.bucket_width.is_finite() && self.bucket_width > 0.0) {
            return Err(JoinError::InvalidConfig(format!(
                "LSH bucket width must be positive and finite, got {}",
                self.bucket_width
            )));
        }
        Ok(())
    }
}

impl Default for LshConfig {
    fn default() -> Self {
        Self::new()
    }
}

type BucketKey = Vec<i32>;

/// Euclidean LSH index over a dataset.
///
/// Stores only point ids; the dataset stays with the caller.
#[derive(Debug, Clone)]
pub struct LshIndex {
    config: LshConfig,
    dimension: usize,
    /// `tables * hashes_per_table` projection vectors, each of `dimension`.
    projections: Vec<f32>,
    /// One offset per projection.
    offsets: Vec<f32>,
    /// One bucket map per table.
    buckets: Vec<HashMap<BucketKey, Vec<u32>>>,
}

impl LshIndex {
    /// Hash every point of `dataset` into `config.tables` tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the dataset has
    /// more than `u32::MAX` points.
    pub fn build(dataset: &Dataset, config: LshConfig) -> JoinResult<Self> {
        config.validate()?;
        let len = u32::try_from(dataset.len()).map_err(|_| {
            JoinError::InvalidConfig(format!("{} points exceed the u32 id space", dataset.len()))
        })?;

        let dimension = dataset.dimension();
        let functions = config.tables * config.hashes_per_table;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let projections: Vec<f32> =
            (0..functions * dimension).map(|_| rng.sample::<f32, _>(StandardNormal)).collect();
        let offsets: Vec<f32> =
            (0..functions).map(|_| rng.gen_range(0.0..config.bucket_width)).collect();

        let mut index = Self { config, dimension, projections, offsets, buckets: Vec::new() };

        for table in 0..index.config.tables {
            let keys: Vec<BucketKey> =
                (0..len).into_par_iter().map(|id| index.key(table, dataset.row(id as usize))).collect();

            let mut map: HashMap<BucketKey, Vec<u32>> = HashMap::new();
            for (id, key) in (0..len).zip(keys) {
                map.entry(key).or_default().push(id);
            }
            debug!(table, buckets = map.len(), "built LSH table");
            index.buckets.push(map);
        }

        info!(
            points = len,
            tables = index.config.tables,
            hashes_per_table = index.config.hashes_per_table,
            bucket_width = index.config.bucket_width,
            "built LSH index"
        );
        Ok(index)
    }

    /// The configuration this index was built with.
    #[must_use]
    pub const fn config(&self) -> &LshConfig {
        &self.config
    }

    /// Number of buckets across all tables.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.iter().map(HashMap::len).sum()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn key(&self, table: usize, point: &[f32]) -> BucketKey {
        let k = self.config.hashes_per_table;
        (table * k..(table + 1) * k)
            .map(|f| {
                let a = &self.projections[f * self.dimension..(f + 1) * self.dimension];
                let dot: f32 = a.iter().zip(point).map(|(x, y)| x * y).sum();
                ((dot + self.offsets[f]) / self.config.bucket_width).floor() as i32
            })
            .collect()
    }
}

impl NeighborProbe for LshIndex {
    fn probe(&self, query: &[f32]) -> Vec<u32> {
        debug_assert_eq!(query.len(), self.dimension, "query dimension mismatch");
        let mut out = Vec::new();
        for (table, map) in self.buckets.iter().enumerate() {
            if let Some(ids) = map.get(&self.key(table, query)) {
                out.extend_from_slice(ids);
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn clustered_dataset() -> Dataset {
        // Two tight clusters far apart.
        let mut rows = Vec::new();
        for i in 0..10 {
            rows.push(vec![0.01 * i as f32, 0.0, 0.0, 0.0]);
        }
        for i in 0..10 {
            rows.push(vec![100.0 + 0.01 * i as f32, 100.0, 100.0, 100.0]);
        }
        Dataset::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = LshConfig::default();
        assert_eq!(config.tables, 8);
        assert_eq!(config.hashes_per_table, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_for_radius() {
        let config = LshConfig::for_radius(0.5);
        assert!((config.bucket_width - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_config() {
        assert!(LshConfig::new().with_tables(0).validate().is_err());
        assert!(LshConfig::new().with_hashes_per_table(0).validate().is_err());
        assert!(LshConfig::new().with_bucket_width(0.0).validate().is_err());
        assert!(LshConfig::new().with_bucket_width(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_probe_finds_self_and_cluster() {
        let ds = clustered_dataset();
        let index = LshIndex::build(&ds, LshConfig::new().with_bucket_width(8.0)).unwrap();

        let candidates = index.probe(ds.row(3));
        assert!(candidates.contains(&3));
        // Nothing from the far cluster shares a bucket with this one.
        assert!(candidates.iter().all(|&id| id < 10));
    }

    #[test]
    fn test_probe_is_sorted_and_unique() {
        let ds = clustered_dataset();
        let index = LshIndex::build(&ds, LshConfig::new().with_tables(16)).unwrap();
        let candidates = index.probe(ds.row(12));
        let mut sorted = candidates.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(candidates, sorted);
    }

    #[test]
    fn test_same_seed_same_buckets() {
        let ds = clustered_dataset();
        let a = LshIndex::build(&ds, LshConfig::new().with_seed(7)).unwrap();
        let b = LshIndex::build(&ds, LshConfig::new().with_seed(7)).unwrap();
        for i in 0..ds.len() {
            assert_eq!(a.probe(ds.row(i)), b.probe(ds.row(i)));
        }
        assert_eq!(a.bucket_count(), b.bucket_count());
    }
}
