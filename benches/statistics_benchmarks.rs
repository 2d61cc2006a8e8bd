//! Statistics benchmarks
//!
//! Per-dataset averages and heap-based top-K over in-memory records, so the
//! numbers exclude CSV parsing (see `store_benchmarks` for that).
//!
//! Run with: cargo bench --bench statistics_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use provenance_db::graph::ProvenanceGraph;
use provenance_db::record::{DatasetRecord, EdgeRecord, ModelRecord};
use provenance_db::stats::{per_dataset_average_accuracy, top_models};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DATASETS: usize = 50;

fn fixture(models: usize) -> (Vec<DatasetRecord>, Vec<ModelRecord>, Vec<EdgeRecord>) {
    let mut rng = StdRng::seed_from_u64(42);
    let datasets: Vec<DatasetRecord> = (0..DATASETS)
        .map(|d| DatasetRecord::new(format!("d{d}"), format!("Dataset {d}"), "bench", "MIT"))
        .collect();
    let records: Vec<ModelRecord> = (0..models)
        .map(|m| {
            ModelRecord::builder(format!("m{m}"), format!("Model_{m}"))
                .accuracy(rng.gen_range(0.70..0.99))
                .timestamp("2024-01-01T00:00:00Z")
                .build()
        })
        .collect();
    let edges: Vec<EdgeRecord> = (0..models)
        .map(|m| EdgeRecord::trained_on(format!("d{}", rng.gen_range(0..DATASETS)), format!("m{m}")))
        .collect();
    (datasets, records, edges)
}

/// Benchmark per-dataset average accuracy
fn bench_average_accuracy(c: &mut Criterion) {
    let mut group = c.benchmark_group("average_accuracy");

    for size in [1_000, 100_000].iter() {
        let (datasets, models, edges) = fixture(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                black_box(per_dataset_average_accuracy(
                    black_box(&datasets),
                    black_box(&models),
                    black_box(&edges),
                ))
            });
        });
    }

    group.finish();
}

/// Benchmark top-K (heap) against a full sort baseline
fn bench_top_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_models");
    let (_, models, _) = fixture(100_000);

    for k in [3, 100].iter() {
        group.bench_with_input(BenchmarkId::new("heap", k), k, |b, &k| {
            b.iter(|| black_box(top_models(black_box(&models), k)));
        });
    }

    group.bench_function("full_sort_baseline", |b| {
        b.iter(|| {
            let mut sorted = models.clone();
            sorted.sort_by(|a, b| b.accuracy().unwrap_or(0.0).total_cmp(&a.accuracy().unwrap_or(0.0)));
            sorted.truncate(3);
            black_box(sorted)
        });
    });

    group.finish();
}

/// Benchmark lineage graph construction
fn bench_graph_build(c: &mut Criterion) {
    let (datasets, models, edges) = fixture(10_000);
    c.bench_function("graph_from_records_10k", |b| {
        b.iter(|| black_box(ProvenanceGraph::from_records(&datasets, &models, &edges)));
    });
}

criterion_group!(benches, bench_average_accuracy, bench_top_models, bench_graph_build);
criterion_main!(benches);
