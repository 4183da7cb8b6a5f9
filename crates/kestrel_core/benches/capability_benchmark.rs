//! # Capability Set Benchmark
//!
//! The matching hot path: intersection tests and bit iteration.
//!
//! Run with: `cargo bench --package kestrel_core --bench capability_benchmark`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kestrel_core::CapabilitySet;

fn striped(len: usize, stride: usize) -> CapabilitySet {
    CapabilitySet::from_indices((0..len).step_by(stride))
}

/// Benchmark: `intersects` on disjoint sets (worst case, scans every word).
fn bench_intersects(c: &mut Criterion) {
    let mut group = c.benchmark_group("intersects_disjoint");

    for len in [64, 256, 4096] {
        let even = striped(len, 2);
        let odd = CapabilitySet::from_indices((1..len).step_by(2));
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| black_box(&even).intersects(black_box(&odd)));
        });
    }

    group.finish();
}

/// Benchmark: walking set bits.
fn bench_iter_ones(c: &mut Criterion) {
    let mut group = c.benchmark_group("iter_ones");

    for stride in [1, 8, 64] {
        let set = striped(4096, stride);
        group.bench_with_input(BenchmarkId::from_parameter(stride), &stride, |b, _| {
            b.iter(|| black_box(&set).iter_ones().sum::<usize>());
        });
    }

    group.finish();
}

/// Benchmark: growing a set one bit at a time.
fn bench_set_growth(c: &mut Criterion) {
    c.bench_function("set_growth_4096", |b| {
        b.iter(|| {
            let mut set = CapabilitySet::new();
            for index in 0..4096 {
                set.set(index, index % 3 == 0);
            }
            black_box(set.count_ones())
        });
    });
}

/// Benchmark: shifting by a non-word-aligned amount.
fn bench_shift(c: &mut Criterion) {
    let set = striped(4096, 3);
    c.bench_function("shift_left_4096_by_13", |b| {
        b.iter(|| black_box(black_box(&set) << 13));
    });
}

criterion_group!(
    benches,
    bench_intersects,
    bench_iter_ones,
    bench_set_growth,
    bench_shift,
);

criterion_main!(benches);
