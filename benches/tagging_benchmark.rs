use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lineage_tag::{forest::test_forest, DaughterRef, Tagger, Vec3};

use rayon::ThreadPoolBuilder;

const N_CANDIDATES: usize = 10_000;

fn two_body_candidates() -> Vec<(DaughterRef, DaughterRef)> {
    [(4, -5), (7, -8), (9, -10), (4, -8), (-6, -5)]
        .into_iter()
        .map(|(pos, neg)| (DaughterRef::from_label(pos), DaughterRef::from_label(neg)))
        .cycle()
        .take(N_CANDIDATES)
        .collect()
}

fn cascade_candidates() -> Vec<(DaughterRef, DaughterRef, DaughterRef)> {
    [(4, -5, -6), (4, -5, -8), (7, -8, -6)]
        .into_iter()
        .map(|(pos, neg, bachelor)| {
            (
                DaughterRef::from_label(pos),
                DaughterRef::from_label(neg),
                DaughterRef::from_label(bachelor),
            )
        })
        .cycle()
        .take(N_CANDIDATES)
        .collect()
}

fn thread_counts() -> Vec<usize> {
    let max_threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (0..)
        .map(|x| 1 << x)
        .take_while(|&p| p <= max_threads)
        .collect()
}

fn tagging_benchmark(c: &mut Criterion) {
    let forest = test_forest();
    let tagger = Tagger::default();
    let primary_vertex = Vec3::zero();
    let two_body = two_body_candidates();
    let cascades = cascade_candidates();
    let mut group = c.benchmark_group("Tagging Performance");
    for threads in thread_counts() {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        group.bench_with_input(
            BenchmarkId::new("two-body", threads),
            &threads,
            |b, &_threads| {
                b.iter(|| {
                    pool.install(|| {
                        black_box(tagger.tag_two_body_all(&two_body, &forest, &primary_vertex))
                    })
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("cascade", threads),
            &threads,
            |b, &_threads| {
                b.iter(|| {
                    pool.install(|| {
                        black_box(tagger.tag_cascade_all(&cascades, &forest, &primary_vertex))
                    })
                })
            },
        );
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = tagging_benchmark
}
criterion_main!(benches);
