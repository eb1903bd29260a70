use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::engine::ValidationError;
use crate::rates::RateError;
use crate::store::StoreError;

/// Top-level error taxonomy surfaced to callers.
///
/// Engine-level functions propagate failures instead of swallowing them: a
/// failed step aborts the whole operation, leaving previously persisted
/// values authoritative. Balances are never silently zeroed on error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("currency conversion failed: {0}")]
    Conversion(#[from] RateError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conversion(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            AppError::Store(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_converts() {
        let err: AppError = ValidationError::EmptyTitle.into();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "validation error: bill title must not be empty"
        );
    }

    #[test]
    fn test_store_error_converts() {
        let err: AppError = StoreError::Io("pool closed".to_string()).into();
        assert!(matches!(err, AppError::Store(_)));
    }
}
