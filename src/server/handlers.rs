//! HTTP request handlers

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::inference::PredictionOutcome;
use crate::security::client_address;
use crate::validation::{validate_batch, validate_observation};

use super::error::{Result, ServerError};
use super::state::AppState;
use super::{MAX_BODY_BYTES, MODEL_VERSION};

/// Accept `application/json` and any `+json` media type
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let mime = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
            mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
        })
        .unwrap_or(false)
}

fn body_error(rejection: BytesRejection) -> ServerError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge {
            limit: MAX_BODY_BYTES,
        }
    } else {
        ServerError::UnreadableBody(rejection.body_text())
    }
}

fn parse_json_body(
    headers: &HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Value> {
    if !is_json(headers) {
        return Err(ServerError::NotJson);
    }
    let body = body.map_err(body_error)?;
    serde_json::from_slice(&body).map_err(|e| ServerError::MalformedJson(e.to_string()))
}

fn timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

fn outcome_value(outcome: &PredictionOutcome) -> Result<Value> {
    serde_json::to_value(outcome).map_err(|e| ServerError::Internal(e.to_string()))
}

// ============================================================================
// Health
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "ExoNeural API",
        "version": env!("CARGO_PKG_VERSION"),
        "team": "ExoNeural Team - NASA Space Apps Challenge 2025",
        "model_loaded": state.model_loaded(),
    }))
}

// ============================================================================
// Prediction
// ============================================================================

pub async fn predict(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<Value>> {
    let payload = parse_json_body(&headers, body)?;
    let observation = validate_observation(&payload)?;

    let outcome = state.predictor.predict(&observation);

    let mut response = outcome_value(&outcome)?;
    if let Value::Object(ref mut map) = response {
        map.insert("status".to_string(), json!("success"));
        map.insert("model_version".to_string(), json!(MODEL_VERSION));
        map.insert("timestamp".to_string(), json!(timestamp()));
    }

    info!(
        client = %client_address(&headers, peer.map(|ConnectInfo(addr)| addr)),
        success = outcome.is_success(),
        "Prediction completed"
    );
    Ok(Json(response))
}

pub async fn batch_predict(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<Value>> {
    let payload = parse_json_body(&headers, body)?;
    let rows = validate_batch(&payload)?;

    // rayon scoring stays off the async workers
    let predictor = Arc::clone(&state.predictor);
    let outcomes = tokio::task::spawn_blocking(move || predictor.predict_batch(&rows))
        .await
        .map_err(|e| ServerError::Internal(format!("batch worker failed: {}", e)))?;

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    let results = outcomes
        .iter()
        .enumerate()
        .map(|(row_index, outcome)| {
            let mut value = outcome_value(outcome)?;
            if let Value::Object(ref mut map) = value {
                map.insert("row_index".to_string(), json!(row_index));
            }
            Ok(value)
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        client = %client_address(&headers, peer.map(|ConnectInfo(addr)| addr)),
        rows = results.len(),
        failed,
        "Batch prediction completed"
    );
    Ok(Json(json!({
        "status": "success",
        "results": results,
        "total_processed": results.len(),
    })))
}
