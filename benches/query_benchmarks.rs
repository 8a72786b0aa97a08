//! Query engine benchmarks: fact lookup, transitive chains, and rule chaining.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use sys2_core::{Session, SessionOptions};

fn make_session() -> Session {
    Session::new(SessionOptions {
        geometry: 4_096,
        ..SessionOptions::default()
    })
    .expect("session")
}

fn bench_direct_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_lookup");
    for size in [100u32, 1_000, 5_000] {
        let mut session = make_session();
        let program: String = (0..size)
            .map(|i| format!("has Item{i} Weight\n"))
            .collect();
        session.learn(&program);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| session.query("has Item0 ?w"));
        });
    }
    group.finish();
}

fn bench_transitive_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("transitive_chain");
    for depth in [10u32, 50, 200] {
        let mut session = make_session();
        let program: String = (0..depth)
            .map(|i| format!("isA Node{i} Node{}\n", i + 1))
            .collect();
        session.learn(&program);

        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| session.prove(&format!("isA Node0 Node{depth}")));
        });
    }
    group.finish();
}

fn bench_rule_chaining(c: &mut Criterion) {
    let mut session = Session::new(SessionOptions {
        geometry: 4_096,
        auto_declare_unknown_operators: true,
        ..SessionOptions::default()
    })
    .expect("session");
    session.learn(
        "has John Motive\n\
         has John Opportunity\n\
         @motive has ?x Motive\n\
         @opportunity has ?x Opportunity\n\
         @suspect isSuspect ?x\n\
         @antecedent And $motive $opportunity\n\
         Implies $antecedent $suspect\n",
    );

    c.bench_function("rule_chaining_and", |b| {
        b.iter(|| session.query("isSuspect ?who"));
    });
}

fn bench_similar_meta(c: &mut Criterion) {
    let mut group = c.benchmark_group("similar_meta");
    for size in [20u32, 100, 500] {
        let mut session = make_session();
        let program: String = (0..size)
            .map(|i| format!("has Animal{i} Fur\ncan Animal{i} Bark\n"))
            .collect();
        session.learn(&program);
        session.learn("has Dog Fur\ncan Dog Bark\n");

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| session.query("similar Dog ?x"));
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(3));
    targets = bench_direct_lookup, bench_transitive_chain, bench_rule_chaining, bench_similar_meta
}
criterion_main!(benches);
