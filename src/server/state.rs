//! Application state management

use std::sync::Arc;

use crate::inference::Predictor;
use crate::security::JwtVerifier;

use super::ServerConfig;

/// Application state shared across handlers.
///
/// Everything here is read-only after startup.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub predictor: Arc<Predictor>,
    /// Token infrastructure; no route requires a token yet
    pub jwt: JwtVerifier,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Load the artifacts named in `config`
    pub fn new(config: ServerConfig) -> Self {
        let predictor = Predictor::from_paths(&config.artifacts);
        Self::with_predictor(config, predictor)
    }

    /// Use an already-built predictor
    pub fn with_predictor(config: ServerConfig, predictor: Predictor) -> Self {
        let jwt = JwtVerifier::from_config(&config.security);
        Self {
            config,
            predictor: Arc::new(predictor),
            jwt,
            started_at: chrono::Utc::now(),
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.predictor.is_loaded()
    }
}
