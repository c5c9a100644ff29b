//! # radjoin
//!
//! Approximate radius self-join for high-dimensional point sets.
//!
//! Given `n` points and a radius, find the pairs within the radius of each
//! other without testing all `n(n-1)/2` pairs. An approximate index proposes
//! candidates for every point; greedy covering picks a small set of seeds
//! whose exact neighborhoods are computed; points sharing a seed are then
//! tested against each other in parallel. Recall is traded for far fewer
//! exact distance evaluations.
//!
//! ## Modules
//!
//! - [`heap`]: indexable binary heap with O(log n) priority updates
//! - [`candidates`]: forward and reverse candidate lists
//! - [`join`]: seed selection, verification and the [`radius_join`] entry point
//! - [`probe`]: candidate generation (brute force, Euclidean LSH)
//! - [`distance`]: SIMD Euclidean distance kernels
//! - [`dataset`]: the point matrix and its binary file format
//! - [`baseline`]: exact linear-scan join and recall
//!
//! ## Example
//!
//! ```
//! use radjoin::{radius_join, Dataset, JoinConfig, LshConfig, LshIndex};
//!
//! let rows: Vec<[f32; 2]> = (0..20).map(|i| [i as f32 * 0.25, 0.0]).collect();
//! let ds = Dataset::from_rows(&rows)?;
//! let index = LshIndex::build(&ds, LshConfig::for_radius(0.5))?;
//! let output = radius_join(&ds, &index, &JoinConfig::new(0.5))?;
//!
//! assert!(output.confirmed_pairs <= 37);
//! # Ok::<(), radjoin::JoinError>(())
//! ```

pub mod baseline;
pub mod candidates;
pub mod dataset;
pub mod distance;
pub mod error;
pub mod heap;
pub mod join;
pub mod probe;

pub use candidates::CandidateModel;
pub use dataset::Dataset;
pub use error::{JoinError, JoinResult};
pub use join::{radius_join, JoinConfig, JoinOutput, JoinStats, RadiusJoin};
pub use probe::{BruteForceProbe, LshConfig, LshIndex, NeighborProbe};
