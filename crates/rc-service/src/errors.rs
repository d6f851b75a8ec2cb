//! Room Controller error types.
//!
//! All errors map to appropriate HTTP status codes via the `IntoResponse`
//! impl. Storage faults are reported to clients with a generic message; the
//! actual error is logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Room Controller error type.
///
/// Maps to HTTP status codes:
/// - Database, Internal: 500 Internal Server Error
/// - NotFound: 404 Not Found
/// - PreconditionFailed: 412 Precondition Failed
/// - BadRequest: 400 Bad Request
#[derive(Debug, Error)]
pub enum RcError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal,
}

impl RcError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            RcError::Database(_) | RcError::Internal => 500,
            RcError::NotFound(_) => 404,
            RcError::PreconditionFailed(_) => 412,
            RcError::BadRequest(_) => 400,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for RcError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            RcError::Database(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "rc.database", error = %err, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            RcError::NotFound(resource) => (StatusCode::NOT_FOUND, "NOT_FOUND", resource.clone()),
            RcError::PreconditionFailed(reason) => (
                StatusCode::PRECONDITION_FAILED,
                "PRECONDITION_FAILED",
                reason.clone(),
            ),
            RcError::BadRequest(reason) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone()),
            RcError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}

/// Convert sqlx errors to RcError
impl From<sqlx::Error> for RcError {
    fn from(err: sqlx::Error) -> Self {
        RcError::Database(err.to_string())
    }
}
