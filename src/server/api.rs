//! API route definitions

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, warn};

use crate::security::{rate_limit_layer, security_headers, RateLimit, RateLimiter};

use super::error::{internal_error_body, ServerError};
use super::{handlers, state::AppState, Environment, ServerConfig, MAX_BODY_BYTES};

async fn handle_404() -> impl IntoResponse {
    ServerError::NotFound
}

async fn handle_405() -> impl IntoResponse {
    ServerError::MethodNotAllowed
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(detail = %detail, "Handler panicked");

    let (status, body) = internal_error_body();
    (status, Json(body)).into_response()
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match config.environment {
        Environment::Production => cors.allow_credentials(true),
        Environment::Development => cors,
    }
}

fn limiter(limit: RateLimit, config: &ServerConfig) -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(limit, config.rate_limit_algorithm))
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let predict_limiter = limiter(config.predict_rate_limit, config);
    let batch_limiter = limiter(config.batch_rate_limit, config);
    let default_limiter = limiter(config.default_rate_limit, config);

    Router::new()
        // Health is never rate limited
        .route("/", get(handlers::health_check))
        .route(
            "/predict",
            post(handlers::predict).route_layer(axum_middleware::from_fn_with_state(
                predict_limiter,
                rate_limit_layer,
            )),
        )
        .route(
            "/batch_predict",
            post(handlers::batch_predict).route_layer(axum_middleware::from_fn_with_state(
                batch_limiter,
                rate_limit_layer,
            )),
        )
        // the fallback router has no routes, so the limiter goes on `layer`
        .fallback(any(handle_404).layer(axum_middleware::from_fn_with_state(
            default_limiter,
            rate_limit_layer,
        )))
        .method_not_allowed_fallback(handle_405)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(axum_middleware::from_fn(security_headers))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}
