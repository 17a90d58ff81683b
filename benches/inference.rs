use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use exoneural::features::{derive, RawObservation};
use exoneural::inference::{ArtifactPaths, Predictor};
use std::path::PathBuf;

fn sample() -> RawObservation {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_observation.json");
    let raw = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn predictor() -> Predictor {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    Predictor::from_paths(&ArtifactPaths::in_dir(dir))
}

fn bench_derive(c: &mut Criterion) {
    let obs = sample();
    c.bench_function("derive_features", |b| b.iter(|| derive(black_box(&obs))));
}

fn bench_predict(c: &mut Criterion) {
    let predictor = predictor();
    let obs = sample();
    c.bench_function("predict_single", |b| b.iter(|| predictor.predict(black_box(&obs))));
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict_batch");
    let predictor = predictor();

    for n_rows in [1, 10, 100].iter() {
        let rows: Vec<RawObservation> = (0..*n_rows).map(|_| sample()).collect();
        group.bench_with_input(BenchmarkId::new("rows", n_rows), &rows, |b, rows| {
            b.iter(|| predictor.predict_batch(black_box(rows)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_derive, bench_predict, bench_batch);
criterion_main!(benches);
