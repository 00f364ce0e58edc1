/**
 * Backend Error Types
 *
 * This module defines the single error type returned by every service and
 * handler in the backend. Each variant maps to one HTTP status code.
 *
 * # Error Categories
 *
 * ## Client Errors
 *
 * - `Validation` / `BadRequest` - malformed input, duplicate email, failed create (400)
 * - `Unauthorized` - missing, invalid or expired bearer token, bad password (401)
 * - `Forbidden` - caller is not the author/recipient, or the letter is in the wrong state (403)
 * - `NotFound` - unknown letter or user (404)
 * - `TooManyRequests` - per-client rate limit exceeded (429)
 *
 * ## Upstream Errors
 *
 * - `Upstream` - a Spotify call failed; carries the status to forward
 * - `ServiceUnavailable` - Spotify credentials are not configured (503)
 *
 * ## Server Errors
 *
 * - `Config`, `Database`, `Internal` (500)
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use love_letters::backend::error::BackendError;
///
/// let err = BackendError::not_found("Letter not found");
/// assert_eq!(err.status_code().as_u16(), 404);
///
/// let err = BackendError::forbidden("Only drafts can be edited");
/// assert_eq!(err.status_code().as_u16(), 403);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request body failed shape validation
    #[error(transparent)]
    Validation(#[from] SharedError),

    /// Request was well-formed but cannot be honoured
    #[error("{0}")]
    BadRequest(String),

    /// Caller could not be authenticated
    #[error("{0}")]
    Unauthorized(String),

    /// Caller is authenticated but may not perform this operation
    #[error("{0}")]
    Forbidden(String),

    /// The addressed resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("{0}")]
    TooManyRequests(String),

    /// Upstream (Spotify) call failed
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        /// Status code to return to the client
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// A dependency is not configured
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Invalid configuration detected at runtime
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything else that is the server's fault
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BackendError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(SharedError::validation(field, message))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn upstream(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream { status, .. } => *status,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the client
    ///
    /// Server-side failures never leak their cause; it is logged instead.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::BadRequest(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::TooManyRequests(message)
            | Self::ServiceUnavailable(message) => message.clone(),
            Self::Upstream { message, .. } => message.clone(),
            Self::Config(_) | Self::Database(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            BackendError::validation("email", "bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BackendError::bad_request("nope").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BackendError::unauthorized("Invalid credentials").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BackendError::forbidden("not yours").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            BackendError::not_found("missing").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BackendError::TooManyRequests("slow down".into()).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            BackendError::upstream(StatusCode::BAD_GATEWAY, "down").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            BackendError::ServiceUnavailable("off".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            BackendError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_shared_error() {
        let shared_error = SharedError::validation("field", "message");
        let backend_error: BackendError = shared_error.into();

        match backend_error {
            BackendError::Validation(_) => {}
            _ => panic!("Expected Validation variant"),
        }
    }

    #[test]
    fn test_server_errors_hide_details() {
        let error = BackendError::internal("disk on fire at /var/lib/secret");
        assert_eq!(error.message(), "Internal server error");

        let error = BackendError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(error.message(), "Internal server error");
    }

    #[test]
    fn test_client_error_message() {
        let error = BackendError::bad_request("User with this email already exists!");
        assert_eq!(error.message(), "User with this email already exists!");
    }
}
