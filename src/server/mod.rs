//! ExoNeural Server Module
//!
//! HTTP front end for the disposition predictor: health check, single and
//! batch prediction, with rate limiting, CORS and security headers.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::inference::ArtifactPaths;
use crate::security::{RateLimit, RateLimitAlgorithm, SecurityConfig};

/// Model version reported with every prediction
pub const MODEL_VERSION: &str = "ExoNeural-v2.0";

/// Largest accepted request body; a full 100-row batch is well under this
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn from_env() -> Self {
        match std::env::var("APP_ENV") {
            Ok(v) if v.eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub cors_origins: Vec<String>,
    pub default_rate_limit: RateLimit,
    pub predict_rate_limit: RateLimit,
    pub batch_rate_limit: RateLimit,
    pub rate_limit_algorithm: RateLimitAlgorithm,
    pub security: SecurityConfig,
    pub artifacts: ArtifactPaths,
}

fn env_parse<T: FromStr>(var: &str, default: T) -> T {
    match std::env::var(var) {
        Ok(raw) => match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(variable = var, value = %raw, "Ignoring unparsable setting");
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("API_PORT", 5000),
            environment: Environment::from_env(),
            cors_origins: parse_origins(
                &std::env::var("CORS_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string()),
            ),
            default_rate_limit: env_parse("RATE_LIMIT_PER_MINUTE", RateLimit::per_minute(60)),
            predict_rate_limit: env_parse("PREDICT_RATE_LIMIT", RateLimit::per_minute(10)),
            batch_rate_limit: env_parse("BATCH_RATE_LIMIT", RateLimit::per_minute(5)),
            rate_limit_algorithm: env_parse("RATE_LIMIT_STRATEGY", RateLimitAlgorithm::FixedWindow),
            security: SecurityConfig::default(),
            artifacts: ArtifactPaths::default(),
        }
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    if config.environment == Environment::Production && config.security.uses_dev_secrets() {
        warn!("Development secret keys in use in production; set SECRET_KEY and JWT_SECRET_KEY");
    }

    let state = Arc::new(AppState::new(config.clone()));
    info!(
        model_loaded = state.predictor.is_loaded(),
        environment = %config.environment,
        "Starting ExoNeural API server"
    );
    if let Some(reason) = state.predictor.load_error() {
        warn!(reason = %reason, "Serving without a model; predictions will return errors");
    }

    let app = create_router(Arc::clone(&state), &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        predict_limit = %config.predict_rate_limit,
        batch_limit = %config.batch_rate_limit,
        cors_origins = ?config.cors_origins,
        "Server listening and ready to accept connections"
    );

    let started_at = state.started_at;
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
        let uptime = chrono::Utc::now().signed_duration_since(started_at);
        info!(
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    info!("Server shut down cleanly");
    Ok(())
}
