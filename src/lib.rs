//! ExoNeural - exoplanet disposition prediction service
//!
//! Classifies Kepler Objects of Interest as false positive, candidate or
//! confirmed exoplanet from 25 measured transit and stellar parameters.
//!
//! # Modules
//!
//! - [`features`] - Raw observations and the six engineered columns
//! - [`preprocessing`] - Fitted imputer and scaler artifacts
//! - [`inference`] - Gradient-boosted tree classifier and prediction pipeline
//! - [`validation`] - Request payload schema checks
//! - [`security`] - Rate limiting, JWT tokens, response hardening
//! - [`server`] - HTTP API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Prediction pipeline
pub mod features;
pub mod preprocessing;
pub mod inference;
pub mod validation;

// Services
pub mod security;
pub mod server;
pub mod cli;

pub use error::{ExoError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{ExoError, Result};
    pub use crate::features::{derive, FeatureVector, RawObservation, FEATURE_COLUMNS};
    pub use crate::inference::{
        ArtifactPaths, Classifier, Disposition, GbdtClassifier, ModelArtifacts, PredictionOutcome,
        PredictionResult, Predictor,
    };
    pub use crate::preprocessing::{Imputer, Scaler};
    pub use crate::validation::{validate_batch, validate_observation, ValidationErrors};
    pub use crate::server::{create_router, AppState, ServerConfig};
}
