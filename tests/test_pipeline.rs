//! Integration test: artifact loading and the full prediction pipeline

use exoneural::features::{derive, RawObservation, FEATURE_COLUMNS};
use exoneural::inference::{ArtifactPaths, Disposition, ModelArtifacts, PredictionOutcome, Predictor};
use exoneural::validation::validate_observation;
use serde_json::Value;
use std::path::{Path, PathBuf};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn sample() -> RawObservation {
    let raw = std::fs::read_to_string(fixtures().join("sample_observation.json")).unwrap();
    let payload: Value = serde_json::from_str(&raw).unwrap();
    validate_observation(&payload).unwrap()
}

fn copy_fixture(name: &str, dir: &Path) {
    std::fs::copy(fixtures().join(name), dir.join(name)).unwrap();
}

#[test]
fn test_fixture_artifacts_load() {
    let artifacts = ModelArtifacts::load(&ArtifactPaths::in_dir(fixtures()))
        .unwrap()
        .expect("model fixture present");
    assert!(artifacts.has_imputer());
    assert!(artifacts.has_scaler());
    assert_eq!(artifacts.classifier().n_classes(), 3);
    assert_eq!(artifacts.classifier().feature_names().len(), FEATURE_COLUMNS.len());
}

#[test]
fn test_end_to_end_prediction() {
    let predictor = Predictor::from_paths(&ArtifactPaths::in_dir(fixtures()));
    assert!(predictor.is_loaded());

    let result = predictor.try_predict(&sample()).unwrap();
    assert_eq!(result.prediction, Disposition::Confirmed);
    assert_eq!(result.raw_prediction, 2);
    assert!((result.probabilities.sum() - 1.0).abs() < 1e-3);

    let p = &result.probabilities;
    let max = p.false_positive.max(p.candidate).max(p.confirmed);
    assert_eq!(result.confidence, max);
}

#[test]
fn test_derived_features_of_sample() {
    let features = derive(&sample()).unwrap();
    assert_eq!(features.get("total_fp_flags"), Some(0.0));
    assert!((features.get("signal_strength").unwrap() - 1055.4 * 95.0).abs() < 1e-6);
}

#[test]
fn test_model_only_directory() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixture("exoplanet_model_multiclass.json", dir.path());

    let predictor = Predictor::from_paths(&ArtifactPaths::in_dir(dir.path()));
    let artifacts = predictor.artifacts().unwrap();
    assert!(!artifacts.has_imputer());
    assert!(!artifacts.has_scaler());
    assert!(predictor.predict(&sample()).is_success());
}

#[test]
fn test_missing_model_leaves_predictor_unloaded() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = Predictor::from_paths(&ArtifactPaths::in_dir(dir.path()));
    assert!(!predictor.is_loaded());
    assert!(predictor.load_error().is_some());
    assert!(matches!(predictor.predict(&sample()), PredictionOutcome::Failure(_)));
}

#[test]
fn test_scaler_column_contract_enforced() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixture("exoplanet_model_multiclass.json", dir.path());

    let raw = std::fs::read_to_string(fixtures().join("scaler.json")).unwrap();
    let mut scaler: Value = serde_json::from_str(&raw).unwrap();
    let names = scaler["feature_names_in"].as_array_mut().unwrap();
    names.swap(0, 1);
    std::fs::write(dir.path().join("scaler.json"), scaler.to_string()).unwrap();

    let err = ModelArtifacts::load(&ArtifactPaths::in_dir(dir.path())).unwrap_err();
    assert!(err.to_string().contains("scaler"));

    let predictor = Predictor::from_paths(&ArtifactPaths::in_dir(dir.path()));
    assert!(!predictor.is_loaded());
}

#[test]
fn test_batch_preserves_order() {
    let predictor = Predictor::from_paths(&ArtifactPaths::in_dir(fixtures()));
    let mut flagged = sample();
    flagged.koi_fpflag_ec = 1;
    let rows = vec![sample(), flagged, sample()];

    let outcomes = predictor.predict_batch(&rows);
    let labels: Vec<Disposition> = outcomes
        .iter()
        .map(|o| o.result().unwrap().prediction)
        .collect();
    assert_eq!(
        labels,
        vec![Disposition::Confirmed, Disposition::FalsePositive, Disposition::Confirmed]
    );
}
