//! Criterion benchmarks for one reference-solver advance.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use plunge_bench::{build_system, reference_profile, small_profile};

fn bench_advance_small(c: &mut Criterion) {
    let mut system = build_system(small_profile()).unwrap();
    // Warm up: first advance sizes the grid.
    system.advance(1.0e-3).unwrap();

    c.bench_function("advance_small", |b| {
        b.iter(|| {
            let dt = system.advance(1.0e-3).unwrap();
            black_box(dt);
        });
    });
}

fn bench_advance_reference(c: &mut Criterion) {
    let mut system = build_system(reference_profile()).unwrap();
    system.advance(1.0e-3).unwrap();

    let mut group = c.benchmark_group("reference");
    group.sample_size(20);
    group.bench_function("advance_reference", |b| {
        b.iter(|| {
            let dt = system.advance(1.0e-3).unwrap();
            black_box(dt);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_advance_small, bench_advance_reference);
criterion_main!(benches);
