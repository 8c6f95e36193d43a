use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::DetectorError;

/// Implements `IntoResponse` so handlers can return `Result<T, ApiError>`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<DetectorError> for ApiError {
    fn from(err: DetectorError) -> Self {
        match err {
            DetectorError::MissingField(field) => Self::MissingField(field),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                "MISSING_FIELD",
                format!("Missing required field: {field}"),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
