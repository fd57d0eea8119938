//! Error types for the risk API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use doc_pipeline::{AnalyzeError, IngestError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("ML model not available")]
    ModelUnavailable,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AnalyzeError> for ApiError {
    fn from(err: AnalyzeError) -> Self {
        match err {
            AnalyzeError::Ingest(IngestError::UnsupportedFormat(ext)) => {
                Self::UnsupportedFormat(ext)
            }
            other => Self::Analysis(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::UnsupportedFormat(ext) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Unsupported file format: {}", ext),
            ),
            ApiError::Analysis(e) => {
                tracing::error!("Analysis error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.clone())
            }
            ApiError::ModelUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "ML model not available".to_string(),
            ),
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
