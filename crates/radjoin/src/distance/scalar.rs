//! Scalar (non-SIMD) distance kernels.
//!
//! Used when the `scalar` feature is enabled or `simd` is disabled.

/// Calculate the squared Euclidean (L2) distance between two vectors.
///
/// # Panics
///
/// Debug-panics if vectors have different lengths.
#[inline]
#[must_use]
pub fn euclidean_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same dimension");
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Squared Euclidean distance that stops once the partial sum exceeds `bound`.
///
/// # Panics
///
/// Debug-panics if vectors have different lengths.
#[inline]
#[must_use]
pub fn euclidean_distance_squared_bounded(a: &[f32], b: &[f32], bound: f32) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same dimension");
    let mut total = 0.0_f32;
    for (x, y) in a.iter().zip(b.iter()) {
        total += (x - y) * (x - y);
        if total > bound {
            break;
        }
    }
    total
}
