//! Custom error types for the booking service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the booking service
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed client input
    #[error("{0}")]
    Validation(String),

    /// Unauthorized access
    #[error("Unauthorized")]
    Unauthorized,

    /// Login rejected; the message never says which credential was wrong
    #[error("{0}")]
    AuthFailed(String),

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Requested slot is no longer available
    #[error("{0}")]
    Conflict(String),

    /// Free-tier AI chat quota exhausted
    #[error("Your AI chat quota has run out.")]
    QuotaExceeded,

    /// An upstream collaborator failed; the operation was aborted
    #[error("{0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal server error")]
    Internal,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Unauthorized" }),
            ),
            AppError::AuthFailed(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::QuotaExceeded => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": "Your AI chat quota has run out.",
                    "reason": "QUOTA_EXCEEDED",
                }),
            ),
            AppError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Database error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for handler results
pub type AppResult<T> = Result<T, AppError>;
