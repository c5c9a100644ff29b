//! Exact distance evaluation.
//!
//! The join confirms every candidate pair with an exact Euclidean distance
//! test. Tests only need to know whether a pair is within the radius, so the
//! kernels work on squared distances and can abandon a sum as soon as it
//! passes `radius²`.
//!
//! # Features
//!
//! - `simd` (default): kernels built on `wide::f32x8`
//! - `scalar`: force the scalar kernels even when `simd` is on (useful for
//!   debugging)
//!
//! Without `simd` the scalar kernels are used.

#[cfg(all(feature = "simd", not(feature = "scalar")))]
mod simd;

#[cfg(any(feature = "scalar", not(feature = "simd")))]
mod scalar;

#[cfg(all(feature = "simd", not(feature = "scalar")))]
pub use simd::{euclidean_distance_squared, euclidean_distance_squared_bounded};

#[cfg(any(feature = "scalar", not(feature = "simd")))]
pub use scalar::{euclidean_distance_squared, euclidean_distance_squared_bounded};

/// Radius membership test, `distance(a, b) <= radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusCheck {
    radius: f32,
    radius_squared: f32,
}

impl RadiusCheck {
    /// Create a check for the given radius.
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self { radius, radius_squared: radius * radius }
    }

    /// The radius this check tests against.
    #[inline]
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Returns true if `a` and `b` are within the radius.
    #[inline]
    #[must_use]
    pub fn contains(&self, a: &[f32], b: &[f32]) -> bool {
        euclidean_distance_squared_bounded(a, b, self.radius_squared) <= self.radius_squared
    }
}
