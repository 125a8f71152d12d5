//! API Error Responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use data_validator::ValidationError;
use serde_json::json;
use storage::StorageError;

/// Errors surfaced synchronously to the ingestion caller.
///
/// Evaluation-path errors never appear here; the escalation engine contains
/// them in its detached task.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid payload: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            ApiError::Storage(err) => {
                tracing::error!(error = %err, "Failed to persist reading");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to log data".to_string(),
                )
            }
        };

        let body = json!({
            "status": "error",
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}
