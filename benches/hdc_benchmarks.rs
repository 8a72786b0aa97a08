//! HDC algebra benchmarks: atom construction, bind, bundle, similarity.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::time::Duration;
use sys2_core::hdc::{DenseBinaryStrategy, HdcContext, StrategyRegistry};
use sys2_core::Vector;

fn make_context(geometry: u32) -> HdcContext {
    let registry = StrategyRegistry::new();
    registry.register(Arc::new(DenseBinaryStrategy::new()));
    HdcContext::new(&registry, "dense-binary", geometry).expect("context")
}

fn bench_create_from_name(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_from_name");
    for geometry in [16_384u32, 32_768, 65_536] {
        let ctx = make_context(geometry);
        let mut counter = 0u64;
        group.bench_with_input(BenchmarkId::from_parameter(geometry), &geometry, |b, _| {
            b.iter(|| {
                counter += 1;
                ctx.create_from_name(&format!("Atom{counter}"), "bench", None)
            });
        });
    }
    group.finish();
}

fn bench_bind(c: &mut Criterion) {
    let ctx = make_context(32_768);
    let a = ctx.create_from_name("Alpha", "bench", None).unwrap();
    let b = ctx.create_from_name("Beta", "bench", None).unwrap();

    c.bench_function("bind_xor", |bencher| {
        bencher.iter(|| ctx.bind(&a, &b));
    });
}

fn bench_bundle(c: &mut Criterion) {
    let mut group = c.benchmark_group("bundle");
    for count in [3usize, 10, 50] {
        let ctx = make_context(32_768);
        let vectors: Vec<Vector> = (0..count)
            .map(|i| ctx.create_from_name(&format!("Member{i}"), "bench", None).unwrap())
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| ctx.bundle(&vectors, None));
        });
    }
    group.finish();
}

fn bench_similarity(c: &mut Criterion) {
    let ctx = make_context(32_768);
    let a = ctx.create_from_name("Alpha", "bench", None).unwrap();
    let b = ctx.create_from_name("Beta", "bench", None).unwrap();

    c.bench_function("similarity", |bencher| {
        bencher.iter(|| ctx.similarity(&a, &b));
    });
}

fn bench_top_k_similar(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_k_similar");
    for pool_size in [100usize, 1_000, 5_000] {
        let ctx = make_context(16_384);
        let query = ctx.create_from_name("Query", "bench", None).unwrap();
        let pool: Vec<(String, Vector)> = (0..pool_size)
            .map(|i| {
                let name = format!("Candidate{i}");
                let v = ctx.create_from_name(&name, "bench", None).unwrap();
                (name, v)
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(pool_size), &pool_size, |b, _| {
            b.iter(|| ctx.top_k_similar(&query, &mut pool.clone().into_iter(), 10));
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(3));
    targets = bench_create_from_name, bench_bind, bench_bundle, bench_similarity, bench_top_k_similar
}
criterion_main!(benches);
