//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;
use crate::tracker::TrackerError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body could not be read
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or unknown session
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request conflicts with current state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Sign-in failed
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Document store error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Tracker operation failed
    #[error("{0}")]
    Tracker(#[from] TrackerError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Auth(AuthError::UnknownSession) => {
                (StatusCode::UNAUTHORIZED, "UNKNOWN_SESSION")
            }
            ApiError::Auth(_) => (StatusCode::UNAUTHORIZED, "AUTH_FAILURE"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ApiError::Tracker(e) => match e {
                TrackerError::AuthFailure(_) | TrackerError::NotAuthenticated => {
                    (StatusCode::UNAUTHORIZED, "AUTH_FAILURE")
                }
                TrackerError::UnknownObjective(_) => (StatusCode::NOT_FOUND, "UNKNOWN_OBJECTIVE"),
                TrackerError::SubscriptionError(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "SUBSCRIPTION_ERROR")
                }
                TrackerError::WriteFailure(_) => (StatusCode::INTERNAL_SERVER_ERROR, "WRITE_FAILURE"),
            },
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Auth(AuthError::UnknownSession), StatusCode::UNAUTHORIZED),
            (
                ApiError::Tracker(TrackerError::UnknownObjective("goal_x".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Tracker(TrackerError::WriteFailure(StoreError::Lock("x".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
