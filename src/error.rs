//! Error types for the ExoNeural service

use thiserror::Error;

/// Result type alias for ExoNeural operations
pub type Result<T> = std::result::Result<T, ExoError>;

/// Main error type for feature engineering, artifact loading and inference
#[derive(Error, Debug)]
pub enum ExoError {
    #[error("Division by zero while computing {feature}: {denominator} is zero")]
    DivisionByZero {
        feature: &'static str,
        denominator: &'static str,
    },

    #[error("Non-finite value computed for {0}")]
    NonFinite(&'static str),

    #[error("Model not loaded. Please ensure model files exist.")]
    ModelNotLoaded,

    #[error("Artifact error ({artifact}): {reason}")]
    ArtifactError { artifact: String, reason: String },

    #[error("Feature schema mismatch in {artifact}: {detail}")]
    SchemaMismatch { artifact: String, detail: String },

    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: usize, actual: usize },

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ExoError {
    fn from(err: serde_json::Error) -> Self {
        ExoError::SerializationError(err.to_string())
    }
}

impl ExoError {
    pub(crate) fn artifact(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        ExoError::ArtifactError {
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }
}
