//! Join configuration.

use serde::{Deserialize, Serialize};

use crate::error::{JoinError, JoinResult};
use crate::heap::MissingKeyPolicy;

/// Default coverage target for balanced-deficit selection.
pub const DEFAULT_COVERAGE_TARGET: u32 = 2;

/// Largest accepted coverage target.
pub const MAX_COVERAGE_TARGET: u32 = 1 << 16;

/// Configuration parameters for a radius join.
///
/// # Parameters
///
/// * `radius` - Pairs with Euclidean distance `<= radius` are joined.
///   Must be positive and finite.
///
/// * `z` - Coverage target for the second selection phase. Covered points
///   confirmed fewer than `z` times are candidates for promotion to seeds.
///   `0` disables the phase. At most [`MAX_COVERAGE_TARGET`].
///
/// * `threads` - Worker threads for the verification pass. `None` uses the
///   global rayon pool (one worker per core).
///
/// * `collect_pairs` - Keep the list of confirmed pairs, not just the count.
///
/// * `missing_key_policy` - Whether a heap decrement on an absent key
///   returns an error (default) or panics (strict mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinConfig {
    /// Distance threshold.
    pub radius: f32,
    /// Coverage target.
    pub z: u32,
    /// Verification worker threads.
    pub threads: Option<usize>,
    /// Keep confirmed pairs in the output.
    pub collect_pairs: bool,
    /// Heap behaviour on a decrement of an absent key.
    pub missing_key_policy: MissingKeyPolicy,
}

impl JoinConfig {
    /// Create a configuration for the given radius.
    ///
    /// Other parameters are set to defaults:
    /// - `z` = 2
    /// - `threads` = `None`
    /// - `collect_pairs` = false
    /// - `missing_key_policy` = [`MissingKeyPolicy::Error`]
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self {
            radius,
            z: DEFAULT_COVERAGE_TARGET,
            threads: None,
            collect_pairs: false,
            missing_key_policy: MissingKeyPolicy::Error,
        }
    }

    /// Set the coverage target.
    #[must_use]
    pub const fn with_z(mut self, z: u32) -> Self {
        self.z = z;
        self
    }

    /// Set the number of verification threads.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Keep the confirmed pair list in the output.
    #[must_use]
    pub const fn with_collect_pairs(mut self, collect: bool) -> Self {
        self.collect_pairs = collect;
        self
    }

    /// Panic instead of erroring on heap invariant violations.
    #[must_use]
    pub const fn with_strict_heap(mut self, strict: bool) -> Self {
        self.missing_key_policy =
            if strict { MissingKeyPolicy::Panic } else { MissingKeyPolicy::Error };
        self
    }

    /// Check that all parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::InvalidConfig`] for a radius that is not a
    /// positive finite number, a coverage target above
    /// [`MAX_COVERAGE_TARGET`] or a thread count of zero.
    pub fn validate(&self) -> JoinResult<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(JoinError::InvalidConfig(format!(
                "radius must be positive and finite, got {}",
                self.radius
            )));
        }
        if self.z > MAX_COVERAGE_TARGET {
            return Err(JoinError::InvalidConfig(format!(
                "coverage target must be at most {MAX_COVERAGE_TARGET}, got {}",
                self.z
            )));
        }
        if self.threads == Some(0) {
            return Err(JoinError::InvalidConfig("thread count must be at least 1".into()));
        }
        Ok(())
    }
}
