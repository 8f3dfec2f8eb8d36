use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;

/// Failures of the local term store mutations and lookups.
///
/// The first four variants surface to the caller as a structured
/// `{success: false, message}` body; `Database` is masked behind a generic
/// internal-error message.
#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("Both keyword and definition must be non-empty.")]
    Validation,

    #[error("Entry already exists: {keyword} -> {definition}")]
    Duplicate { keyword: String, definition: String },

    #[error("Entry not found: {keyword} -> {definition}")]
    NotFound { keyword: String, definition: String },

    #[error("Cannot remove built-in entries. Only custom-added entries can be removed.")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Structured failure payload for mutation endpoints.
#[derive(Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for StoreError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            StoreError::Validation => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            StoreError::Duplicate { .. } => (StatusCode::CONFLICT, self.to_string()),
            StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, self.to_string()),
            StoreError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            StoreError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred.".to_string(),
            ),
        };
        (
            status,
            Json(FailureBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}
