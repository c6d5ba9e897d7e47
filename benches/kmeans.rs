//! Benchmarks for clustering and cluster classification.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use storage_tiering::classification::{CategoryModel, ClusterClassifier};
use storage_tiering::clustering::{kmeans, KMeansConfig};
use storage_tiering::core::{FeatureMatrix, ACCESS_PATTERN_FEATURES};
use storage_tiering::pipeline::{group_by_label, PipelineConfig, TieringPipeline};

fn generate_features(n: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            ACCESS_PATTERN_FEATURES
                .iter()
                .map(|_| rng.gen_range(0.0..=1.0))
                .collect()
        })
        .collect()
}

fn generate_matrix(n: usize) -> FeatureMatrix {
    FeatureMatrix::new(
        ACCESS_PATTERN_FEATURES.iter().map(|s| s.to_string()).collect(),
        (0..n).map(|i| format!("/bench/file_{}", i)).collect(),
        generate_features(n, 42),
    )
    .expect("generated features are normalized")
}

fn bench_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans");

    for size in [100, 1_000, 10_000].iter() {
        let rows = generate_features(*size, 7);

        for k in [4, 8].iter() {
            let config = KMeansConfig::default().k(*k).seed(42);
            group.bench_with_input(BenchmarkId::new(format!("k={}", k), size), size, |b, _| {
                b.iter(|| kmeans(black_box(&rows), &config))
            });
        }
    }

    group.finish();
}

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");

    let matrix = generate_matrix(10_000);
    let result = kmeans(matrix.rows(), &KMeansConfig::default().k(4).seed(42))
        .expect("valid clustering config");
    let groups =
        group_by_label(&matrix, &result.labels, result.k()).expect("labels come from kmeans");
    let classifier = ClusterClassifier::new(CategoryModel::access_pattern_default());

    group.bench_function("classify_4_clusters", |b| {
        b.iter(|| classifier.classify(black_box(&groups)))
    });

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for size in [1_000, 10_000].iter() {
        let matrix = generate_matrix(*size);
        let pipeline = TieringPipeline::new(
            CategoryModel::access_pattern_default(),
            PipelineConfig::default(),
        );

        group.bench_with_input(BenchmarkId::new("run", size), size, |b, _| {
            b.iter(|| pipeline.run(black_box(&matrix)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_kmeans, bench_classification, bench_pipeline);
criterion_main!(benches);
