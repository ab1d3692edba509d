//! Hit counting strategy benchmarks
//!
//! Compares one reduction with regeneration against one reduction over a
//! persisted dataset, plus the cost of persisting.
//!
//! Run with: cargo bench --bench strategies

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pi_bench::context::ExecutionContext;
use pi_bench::sampler::{HitGenerator, RandomSource};
use pi_bench::strategy::{CachingMode, HitCounter};
use std::sync::Arc;

const PARTITIONS: usize = 8;

fn bench_ctx() -> ExecutionContext {
    ExecutionContext::builder()
        .app_name("strategy-bench")
        .build()
        .unwrap()
}

/// Benchmark one reduction per caching mode
fn bench_reduce_hits(c: &mut Criterion) {
    let ctx = bench_ctx();
    let generator: Arc<dyn HitGenerator> = Arc::new(RandomSource::Thread);
    let mut group = c.benchmark_group("reduce_hits");

    for n in [10_000u64, 100_000, 1_000_000] {
        for mode in CachingMode::ALL {
            let counter = mode
                .strategy(&ctx, Arc::clone(&generator), n, PARTITIONS)
                .unwrap();
            group.bench_with_input(BenchmarkId::new(mode.label(), n), &n, |b, &n| {
                b.iter(|| black_box(counter.reduce_hits(&ctx, black_box(n)).unwrap()));
            });
        }
    }

    group.finish();
}

/// Benchmark materializing a cached dataset
fn bench_persist(c: &mut Criterion) {
    let ctx = bench_ctx();
    let mut group = c.benchmark_group("persist");

    for n in [10_000u64, 100_000, 1_000_000] {
        let range = ctx.parallelize(n, PARTITIONS).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &range, |b, range| {
            b.iter(|| black_box(range.persist(&ctx, &RandomSource::Thread)));
        });
    }

    group.finish();
}

/// Benchmark the random sources against each other
fn bench_random_sources(c: &mut Criterion) {
    let ctx = bench_ctx();
    let range = ctx.parallelize(100_000, PARTITIONS).unwrap();
    let mut group = c.benchmark_group("random_source");

    for (name, source) in [("thread", RandomSource::Thread), ("os", RandomSource::Os)] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(range.map_reduce_hits(&ctx, &source)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reduce_hits, bench_persist, bench_random_sources);
criterion_main!(benches);
