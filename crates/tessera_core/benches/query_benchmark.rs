//! # Query Benchmark
//!
//! The query engine is a full linear scan, so cost should track the issued
//! entity count and not the result size. These benchmarks check that.
//!
//! Run with: `cargo bench --package tessera_core --bench query_benchmark`

// Benchmarks don't need docs and may have intentionally unused code
#![allow(missing_docs)]
#![allow(dead_code)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_core::{QueryMask, Registry};

/// Builds a registry where entity `i` carries type `t` iff bit `t` of `i` is set.
fn populated(count: usize) -> Registry {
    let mut registry = Registry::with_sizes(&[4, 4, 4, 4]).unwrap();
    for i in 0..count {
        let e = registry.create().unwrap();
        for t in 0..4 {
            if i & (1 << t) != 0 {
                registry.add(e, t, &[0; 4]).unwrap();
            }
        }
    }
    registry
}

/// Benchmark: buffered query at growing entity counts.
fn bench_query_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_two_types");

    for count in [1_000, 10_000, 50_000] {
        let mut registry = populated(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(registry.query(&[0, 1]).unwrap().len()));
        });
    }

    group.finish();
}

/// Benchmark: selective vs broad queries over the same entities.
fn bench_query_selectivity(c: &mut Criterion) {
    let mut registry = populated(50_000);
    let mut group = c.benchmark_group("query_selectivity_50K");

    group.bench_function("all_live", |b| {
        b.iter(|| black_box(registry.query_mask(QueryMask::empty()).len()));
    });

    group.bench_function("four_types", |b| {
        b.iter(|| black_box(registry.query(&[0, 1, 2, 3]).unwrap().len()));
    });

    group.bench_function("lazy_four_types", |b| {
        b.iter(|| black_box(registry.query_iter(&[0, 1, 2, 3]).unwrap().count()));
    });

    group.finish();
}

criterion_group!(benches, bench_query_scaling, bench_query_selectivity);

criterion_main!(benches);
