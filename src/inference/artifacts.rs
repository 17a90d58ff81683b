//! Artifact loading

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::model::{Classifier, GbdtClassifier};
use crate::error::{ExoError, Result};
use crate::preprocessing::{FeatureTransform, Imputer, Scaler};

/// Where the artifact files live
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub imputer: PathBuf,
    pub scaler: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: env_path("MODEL_PATH", "exoplanet_model_multiclass.json"),
            imputer: env_path("IMPUTER_PATH", "imputer.json"),
            scaler: env_path("SCALER_PATH", "scaler.json"),
        }
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

impl ArtifactPaths {
    /// All three artifacts under one directory, with the default file names
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join("exoplanet_model_multiclass.json"),
            imputer: dir.join("imputer.json"),
            scaler: dir.join("scaler.json"),
        }
    }
}

fn read_artifact(path: &Path, artifact: &str) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| ExoError::artifact(artifact, format!("failed to read {}: {}", path.display(), e)))
}

/// The classifier plus optional preprocessing, immutable after load
#[derive(Debug)]
pub struct ModelArtifacts {
    classifier: Box<dyn Classifier>,
    imputer: Option<Imputer>,
    scaler: Option<Scaler>,
}

impl ModelArtifacts {
    /// Assemble from already-built parts
    pub fn new(classifier: Box<dyn Classifier>, imputer: Option<Imputer>, scaler: Option<Scaler>) -> Self {
        Self {
            classifier,
            imputer,
            scaler,
        }
    }

    /// Load artifacts from disk.
    ///
    /// Returns `Ok(None)` when the model file does not exist. The imputer and
    /// scaler are optional and only read when present. Any artifact that
    /// exists but fails to parse or breaks the column contract fails the
    /// whole load.
    pub fn load(paths: &ArtifactPaths) -> Result<Option<Self>> {
        if !paths.model.exists() {
            return Ok(None);
        }

        let classifier = GbdtClassifier::from_json(&read_artifact(&paths.model, "model")?)?;
        info!(
            path = %paths.model.display(),
            trees = classifier.n_trees(),
            classes = classifier.n_classes(),
            "Gradient-boosted model loaded"
        );

        let scaler = if paths.scaler.exists() {
            let scaler = Scaler::from_json(&read_artifact(&paths.scaler, "scaler")?)?;
            info!(path = %paths.scaler.display(), scaler_type = ?scaler.scaler_type(), "Scaler loaded");
            Some(scaler)
        } else {
            None
        };

        let imputer = if paths.imputer.exists() {
            let imputer = Imputer::from_json(&read_artifact(&paths.imputer, "imputer")?)?;
            info!(path = %paths.imputer.display(), strategy = ?imputer.strategy(), "Imputer loaded");
            Some(imputer)
        } else {
            None
        };

        let artifacts = Self::new(Box::new(classifier), imputer, scaler);
        let steps: Vec<&str> = artifacts.transforms().map(|t| t.name()).collect();
        info!(steps = ?steps, "Preprocessing pipeline ready");
        Ok(Some(artifacts))
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn has_imputer(&self) -> bool {
        self.imputer.is_some()
    }

    pub fn has_scaler(&self) -> bool {
        self.scaler.is_some()
    }

    /// Preprocessing steps in application order: imputer, then scaler
    pub fn transforms(&self) -> impl Iterator<Item = &dyn FeatureTransform> {
        let imputer = self.imputer.as_ref().map(|i| i as &dyn FeatureTransform);
        let scaler = self.scaler.as_ref().map(|s| s as &dyn FeatureTransform);
        imputer.into_iter().chain(scaler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FEATURE_COLUMNS, FEATURE_COUNT};
    use crate::inference::model::tests::small_model_json;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_missing_model_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ModelArtifacts::load(&ArtifactPaths::in_dir(dir.path())).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_model_only() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "exoplanet_model_multiclass.json", &small_model_json());
        let loaded = ModelArtifacts::load(&ArtifactPaths::in_dir(dir.path()))
            .unwrap()
            .unwrap();
        assert!(!loaded.has_imputer());
        assert!(!loaded.has_scaler());
        assert_eq!(loaded.transforms().count(), 0);
    }

    #[test]
    fn test_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "exoplanet_model_multiclass.json", &small_model_json());
        let scaler = serde_json::json!({
            "scaler_type": "Standard",
            "feature_names_in": FEATURE_COLUMNS,
            "center": vec![0.0; FEATURE_COUNT],
            "scale": vec![1.0; FEATURE_COUNT],
        });
        let imputer = serde_json::json!({
            "strategy": "median",
            "feature_names_in": FEATURE_COLUMNS,
            "statistics": vec![0.0; FEATURE_COUNT],
        });
        write(dir.path(), "scaler.json", &scaler.to_string());
        write(dir.path(), "imputer.json", &imputer.to_string());

        let loaded = ModelArtifacts::load(&ArtifactPaths::in_dir(dir.path()))
            .unwrap()
            .unwrap();
        let names: Vec<_> = loaded.transforms().map(|t| t.name()).collect();
        assert_eq!(names, vec!["imputer", "scaler"]);
    }

    #[test]
    fn test_corrupt_scaler_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "exoplanet_model_multiclass.json", &small_model_json());
        write(dir.path(), "scaler.json", "{ not json");
        let err = ModelArtifacts::load(&ArtifactPaths::in_dir(dir.path())).unwrap_err();
        assert!(matches!(err, ExoError::SerializationError(_)));
    }
}
