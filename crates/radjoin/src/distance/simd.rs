//! SIMD-optimized distance kernels using the `wide` crate.
//!
//! `wide` selects the best available instruction set at compile time
//! (SSE2/AVX on x86, NEON on ARM, SIMD128 on WebAssembly) and falls back to
//! scalar code elsewhere. All kernels process 8 floats per step with `f32x8`.

use wide::f32x8;

/// Number of f32 elements processed per SIMD iteration.
const SIMD_WIDTH: usize = 8;

/// Elements accumulated between early-abandon checks.
const ABANDON_STRIDE: usize = SIMD_WIDTH * 4;

#[inline]
fn load(slice: &[f32]) -> f32x8 {
    f32x8::new(slice.try_into().unwrap_or([0.0; SIMD_WIDTH]))
}

#[inline]
fn horizontal_sum(v: f32x8) -> f32 {
    v.to_array().iter().sum()
}

/// Calculate the squared Euclidean (L2) distance between two vectors.
///
/// # Panics
///
/// Debug-panics if vectors have different lengths.
#[inline]
#[must_use]
pub fn euclidean_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same dimension");

    let len = a.len();
    let simd_len = len - (len % SIMD_WIDTH);

    let mut sum = f32x8::ZERO;
    for i in (0..simd_len).step_by(SIMD_WIDTH) {
        let diff = load(&a[i..i + SIMD_WIDTH]) - load(&b[i..i + SIMD_WIDTH]);
        sum += diff * diff;
    }

    let mut result = horizontal_sum(sum);
    for i in simd_len..len {
        let diff = a[i] - b[i];
        result += diff * diff;
    }
    result
}

/// Squared Euclidean distance that stops once the partial sum exceeds `bound`.
///
/// The return value is exact when it is `<= bound`; otherwise it is some
/// partial sum greater than `bound`.
///
/// # Panics
///
/// Debug-panics if vectors have different lengths.
#[inline]
#[must_use]
pub fn euclidean_distance_squared_bounded(a: &[f32], b: &[f32], bound: f32) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same dimension");

    let len = a.len();
    let block_len = len - (len % ABANDON_STRIDE);

    let mut total = 0.0_f32;
    for start in (0..block_len).step_by(ABANDON_STRIDE) {
        let mut sum = f32x8::ZERO;
        for i in (start..start + ABANDON_STRIDE).step_by(SIMD_WIDTH) {
            let diff = load(&a[i..i + SIMD_WIDTH]) - load(&b[i..i + SIMD_WIDTH]);
            sum += diff * diff;
        }
        total += horizontal_sum(sum);
        if total > bound {
            return total;
        }
    }

    total + euclidean_distance_squared(&a[block_len..], &b[block_len..])
}
