//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Request must be JSON")]
    NotJson,

    #[error("Malformed JSON body: {0}")]
    MalformedJson(String),

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Could not read request body: {0}")]
    UnreadableBody(String),

    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ServerError {
    fn from(errors: ValidationErrors) -> Self {
        ServerError::Validation(errors)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ServerError::NotJson => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Request must be JSON", "status": "error" }),
            ),
            ServerError::MalformedJson(detail) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Malformed JSON body", "details": detail, "status": "error" }),
            ),
            ServerError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({
                    "error": "Request body too large",
                    "details": format!("Maximum body size is {} bytes", limit),
                    "status": "error",
                }),
            ),
            ServerError::UnreadableBody(detail) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Could not read request body", "details": detail, "status": "error" }),
            ),
            ServerError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Validation error",
                    "details": errors.into_value(),
                    "status": "error",
                }),
            ),
            ServerError::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Not found", "status": "error" }),
            ),
            ServerError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": "Method not allowed", "status": "error" }),
            ),
            ServerError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal server error");
                internal_error_body()
            }
        };

        (status, Json(body)).into_response()
    }
}

pub(crate) fn internal_error_body() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({
            "error": "Internal server error",
            "status": "error",
            "details": "An unexpected error occurred",
        }),
    )
}

pub type Result<T> = std::result::Result<T, ServerError>;
