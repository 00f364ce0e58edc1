//! Shared Error Types
//!
//! This module defines error types that describe malformed requests. They are
//! produced by the boundary validation step (see [`Validate`]) before a
//! request reaches any service, and the backend converts them into
//! `400 Bad Request` responses.
//!
//! # Error Categories
//!
//! - `ValidationError` - A field is present but its value is not acceptable
//! - `MissingField` - A required field was not supplied at all
//!
//! # Usage
//!
//! ```rust
//! use love_letters::shared::error::SharedError;
//!
//! let error = SharedError::validation("content", "Letter content cannot be empty");
//! assert!(error.to_string().contains("content"));
//! ```
use thiserror::Error;

/// Request-shape errors shared by every request type
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// A required field was absent
    #[error("Missing required field '{field}'")]
    MissingField {
        /// The field that was expected
        field: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new missing field error
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

/// Explicit schema validation for request bodies
///
/// Every request type accepted at the HTTP boundary implements this trait.
/// Deserialization already guarantees types and required fields; `validate`
/// checks the constraints serde cannot express (non-empty text, email shape,
/// URL scheme, minimum lengths).
pub trait Validate {
    /// Check the value, returning the first violation found
    fn validate(&self) -> Result<(), SharedError>;
}

/// Check that a string field holds something other than whitespace
pub fn require_non_blank(field: &str, value: &str) -> Result<(), SharedError> {
    if value.trim().is_empty() {
        return Err(SharedError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Basic email shape check: a non-empty local part, an `@`, and a dotted domain
pub fn require_email(field: &str, value: &str) -> Result<(), SharedError> {
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(SharedError::validation(field, "must be a valid email address"));
    }
    Ok(())
}

/// Check that an optional URL field, when present, is an absolute http(s) URL
pub fn require_http_url(field: &str, value: Option<&str>) -> Result<(), SharedError> {
    let Some(value) = value else {
        return Ok(());
    };

    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));

    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') && !value.contains(char::is_whitespace) => Ok(()),
        _ => Err(SharedError::validation(field, "must be an http(s) URL")),
    }
}
