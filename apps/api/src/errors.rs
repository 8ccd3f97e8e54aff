use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::interview::classify::ErrorCategory;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    /// Request body that is not a JSON form at all.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// A save attempt already running for this session.
    #[error("A save is already in progress")]
    Busy,

    /// A save attempt that ended in a classified failure.
    #[error("Save failed: {0:?}")]
    Pipeline(ErrorCategory),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

fn category_status(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::MissingFields => StatusCode::BAD_REQUEST,
        ErrorCategory::Quota => StatusCode::TOO_MANY_REQUESTS,
        ErrorCategory::Network | ErrorCategory::ParseError => StatusCode::BAD_GATEWAY,
        ErrorCategory::Configuration
        | ErrorCategory::PersistenceFailure
        | ErrorCategory::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::InvalidBody(msg) => (
                StatusCode::BAD_REQUEST,
                "INVALID_BODY",
                msg.clone(),
            ),
            AppError::Busy => (
                StatusCode::CONFLICT,
                "SAVE_IN_PROGRESS",
                "Questions are already being generated for this interview".to_string(),
            ),
            // Diagnostics were logged by the pipeline; only the fixed message goes out.
            AppError::Pipeline(category) => (
                category_status(*category),
                category.code(),
                category.user_message().to_string(),
            ),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
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
