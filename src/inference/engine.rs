//! Prediction pipeline
//!
//! feature engineering -> imputer -> scaler -> classifier -> result.
//! The loaded artifacts are read-only, so one [`Predictor`] is shared by every
//! request through an `Arc`.

use rayon::prelude::*;
use tracing::{error, warn};

use super::artifacts::{ArtifactPaths, ModelArtifacts};
use super::result::{PredictionOutcome, PredictionResult};
use crate::error::{ExoError, Result};
use crate::features::{self, RawObservation};

/// Disposition predictor over a fixed artifact set
#[derive(Debug)]
pub struct Predictor {
    artifacts: Option<ModelArtifacts>,
    load_error: Option<String>,
}

impl Predictor {
    /// Wrap artifacts that are already loaded
    pub fn new(artifacts: ModelArtifacts) -> Self {
        Self {
            artifacts: Some(artifacts),
            load_error: None,
        }
    }

    /// A predictor with no model; every call yields a failure outcome
    pub fn unloaded(reason: impl Into<String>) -> Self {
        Self {
            artifacts: None,
            load_error: Some(reason.into()),
        }
    }

    /// Load artifacts from disk. Never fails: a missing or broken model
    /// leaves the predictor in the unloaded state and is logged.
    pub fn from_paths(paths: &ArtifactPaths) -> Self {
        match ModelArtifacts::load(paths) {
            Ok(Some(artifacts)) => Self::new(artifacts),
            Ok(None) => {
                warn!(path = %paths.model.display(), "Model file not found");
                Self::unloaded(format!("model file {} not found", paths.model.display()))
            }
            Err(e) => {
                error!(error = %e, "Error loading models");
                Self::unloaded(e.to_string())
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.artifacts.is_some()
    }

    /// Why the artifacts did not load, if they did not
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn artifacts(&self) -> Option<&ModelArtifacts> {
        self.artifacts.as_ref()
    }

    /// Run the full pipeline and surface any failure as an error
    pub fn try_predict(&self, obs: &RawObservation) -> Result<PredictionResult> {
        let artifacts = self.artifacts.as_ref().ok_or(ExoError::ModelNotLoaded)?;

        let mut features = features::derive(obs)?;
        for transform in artifacts.transforms() {
            transform.transform(&mut features)?;
        }

        let proba = artifacts.classifier().predict_proba(features.view())?;
        PredictionResult::from_probabilities(&proba)
    }

    /// Run the pipeline; failures become an error payload
    pub fn predict(&self, obs: &RawObservation) -> PredictionOutcome {
        let res = self.try_predict(obs);
        if let Err(ref e) = res {
            if !matches!(e, ExoError::ModelNotLoaded) {
                error!(error = %e, "Prediction error");
            }
        }
        res.into()
    }

    /// Score every row; output order and length match the input
    pub fn predict_batch(&self, rows: &[RawObservation]) -> Vec<PredictionOutcome> {
        rows.par_iter().map(|obs| self.predict(obs)).collect()
    }
}
