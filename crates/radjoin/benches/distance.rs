//! Benchmarks for the distance kernels.
//!
//! Run with: `cargo bench -p radjoin --bench distance`
//!
//! Compare SIMD vs scalar: `cargo bench -p radjoin --bench distance --features scalar`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use radjoin::distance::{euclidean_distance_squared, euclidean_distance_squared_bounded, RadiusCheck};
use rand::Rng;

fn random_vector(dim: usize) -> Vec<f32> {
    let mut rng = rand::thread_rng();
    (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn bench_squared(c: &mut Criterion) {
    let mut group = c.benchmark_group("euclidean_distance_squared");

    for dim in [16, 128, 384, 960] {
        let a = random_vector(dim);
        let b = random_vector(dim);

        group.throughput(Throughput::Elements(dim as u64));
        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |bench, _| {
            bench.iter(|| euclidean_distance_squared(black_box(&a), black_box(&b)));
        });
    }

    group.finish();
}

/// A tight bound lets the bounded kernel stop after the first stride.
fn bench_bounded(c: &mut Criterion) {
    let mut group = c.benchmark_group("euclidean_distance_squared_bounded");

    for dim in [128, 384, 960] {
        let a = random_vector(dim);
        let b = random_vector(dim);

        group.throughput(Throughput::Elements(dim as u64));
        group.bench_with_input(BenchmarkId::new("tight", dim), &dim, |bench, _| {
            bench.iter(|| euclidean_distance_squared_bounded(black_box(&a), black_box(&b), 0.5));
        });
        group.bench_with_input(BenchmarkId::new("loose", dim), &dim, |bench, _| {
            bench.iter(|| {
                euclidean_distance_squared_bounded(black_box(&a), black_box(&b), f32::MAX)
            });
        });
    }

    group.finish();
}

fn bench_radius_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("radius_check");
    let dim = 128;
    let a = random_vector(dim);
    let b = random_vector(dim);

    for radius in [0.5_f32, 4.0, 16.0] {
        let check = RadiusCheck::new(radius);
        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |bench, _| {
            bench.iter(|| check.contains(black_box(&a), black_box(&b)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_squared, bench_bounded, bench_radius_check);
criterion_main!(benches);
