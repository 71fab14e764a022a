use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use massval_core::error::{BatchSizeFailure, ImportError};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`ImportError`] for fatal submission failures and adds
/// HTTP-specific variants. Row-level validation problems are not errors:
/// they are returned in a successful response body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The workbook was rejected before any row was validated.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- Fatal submission errors ---
            AppError::Import(ImportError::Parse(failure)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PARSE_ERROR",
                failure.to_string(),
            ),
            AppError::Import(ImportError::BatchSize(failure)) => {
                let code = match failure {
                    BatchSizeFailure::TooFewRows { .. } => "NOT_ENOUGH_ROWS",
                    BatchSizeFailure::TooManyRows { .. } => "TOO_MANY_ROWS",
                };
                (StatusCode::UNPROCESSABLE_ENTITY, code, failure.to_string())
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
