//! Inference module
//!
//! Provides the disposition prediction pipeline:
//! - Artifact loading with column-contract checks
//! - LightGBM-dump gradient-boosted tree evaluation
//! - Optional imputation and scaling before the classifier
//! - Labelled, rounded probability results
//! - Parallel batch scoring via rayon

mod artifacts;
mod engine;
pub(crate) mod model;
mod result;

pub use artifacts::{ArtifactPaths, ModelArtifacts};
pub use engine::Predictor;
pub use model::{Classifier, GbdtClassifier};
pub use result::{
    ClassProbabilities, Disposition, PredictionFailure, PredictionOutcome, PredictionResult,
};
