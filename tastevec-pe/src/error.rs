//! Error types for tastevec-pe
//!
//! Every handler failure ends up as an [`ApiError`], which renders as
//! `{"error": {"code": ..., "message": ...}}` with a matching status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::PipelineError;
use crate::services::{CatalogError, FetchError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Preference estimation failed
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Track search failed upstream (502)
    #[error("Upstream error: {0}")]
    Upstream(#[from] CatalogError),

    /// Request abandoned because the service is shutting down (503)
    #[error("Cancelled: {0}")]
    Cancelled(#[from] FetchError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Status code and machine-readable error code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            ApiError::Pipeline(err) => match err {
                PipelineError::InvalidInput => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                PipelineError::InsufficientData { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_DATA")
                }
                PipelineError::NoDominantCluster { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "NO_DOMINANT_CLUSTER")
                }
                PipelineError::InvalidParameter { .. }
                | PipelineError::DimensionMismatch { .. }
                | PipelineError::NonFiniteValue { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Cancelled(_) => (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(code = error_code, error = %self, "Request failed");
        } else {
            tracing::info!(code = error_code, error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
