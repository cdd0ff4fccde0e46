use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::completion::AiError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    BadRequest(String),
    NotFound(String),
    /// A failed AI call: 500 with the upstream reason in `details`.
    Upstream { error: &'static str, details: String },
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    pub(crate) fn upstream(err: &AiError, error: &'static str) -> Self {
        tracing::error!(error = %err, "{error}");
        Self::Upstream { error, details: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse { error: message, details: None })
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, ErrorResponse { error: message, details: None })
            }
            ApiError::Upstream { error, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse { error: error.to_string(), details: Some(details) },
            ),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse { error: message, details: None },
            ),
        };

        (status, Json(body)).into_response()
    }
}
