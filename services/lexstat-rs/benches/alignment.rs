//! Alignment kernel benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lexstat_core::config::AlignmentConfig;
use lexstat_core::phonetic::{align_path, align_score, edit_distance, ScaDistance};
use lexstat_core::sound_class::sound_class;
use lexstat_core::tokenize;

fn classes(word: &str) -> Vec<char> {
    tokenize(word).iter().map(|s| sound_class(s)).collect()
}

fn bench_class_alignment(c: &mut Criterion) {
    let sca = ScaDistance::new(AlignmentConfig::default());
    let a = classes("tʰoxtər");
    let b = classes("dɔxtər");

    c.bench_function("sca_distance_short", |bench| {
        bench.iter(|| sca.class_distance(black_box(&a), black_box(&b)))
    });
    c.bench_function("sca_path_short", |bench| {
        bench.iter(|| sca.path(black_box(&a), black_box(&b)))
    });
}

fn bench_alignment_length(c: &mut Criterion) {
    let gap = AlignmentConfig::default();
    let mut group = c.benchmark_group("align_score");
    for len in [4usize, 8, 16, 32] {
        let a: Vec<usize> = (0..len).map(|i| i % 7).collect();
        let b: Vec<usize> = (0..len).map(|i| (i * 3) % 7).collect();
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |bench, _| {
            bench.iter(|| {
                align_score(a.len(), b.len(), &gap, |i, j| {
                    if a[i] == b[j] {
                        1.0
                    } else {
                        -1.0
                    }
                })
            })
        });
    }
    group.finish();

    let a: Vec<usize> = (0..16).collect();
    c.bench_function("align_path_16", |bench| {
        bench.iter(|| align_path(a.len(), a.len(), &gap, |i, j| if i == j { 1.0 } else { -1.0 }))
    });
}

fn bench_edit_distance(c: &mut Criterion) {
    let a = tokenize("tardi5a");
    let b = tokenize("sware");
    c.bench_function("edit_distance", |bench| {
        bench.iter(|| edit_distance(black_box(&a), black_box(&b)))
    });
}

criterion_group!(
    benches,
    bench_class_alignment,
    bench_alignment_length,
    bench_edit_distance
);
criterion_main!(benches);
