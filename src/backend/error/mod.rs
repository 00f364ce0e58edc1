//! Backend Error Module
//!
//! This module defines the error type returned by services and HTTP handlers.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - Error conversion implementations
//! ```
//!
//! # HTTP Response Conversion
//!
//! `BackendError` implements `IntoResponse` from Axum, allowing it to be
//! returned directly from handlers. The error is converted to the status code
//! of its variant and a `{"error", "status"}` JSON body.
//!
//! # Example
//!
//! ```rust,no_run
//! use love_letters::backend::error::BackendError;
//! use axum::Json;
//!
//! async fn handler() -> Result<Json<()>, BackendError> {
//!     Err(BackendError::not_found("Letter not found"))
//! }
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
