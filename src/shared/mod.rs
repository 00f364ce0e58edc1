//! Shared Module
//!
//! This module contains the types exchanged over the HTTP API: letters,
//! their lifecycle status, request bodies, and the request-shape validation
//! errors. They carry no server dependencies, so a Rust client can reuse them
//! for serialization.

/// Letter data structure and lifecycle status
pub mod letter;

/// User management request types
pub mod user;

/// Shared error types and boundary validation
pub mod error;

/// Re-export commonly used types for convenience
pub use letter::{CreateLetterRequest, Letter, LetterStatus, SendLetterRequest, UpdateLetterRequest};
pub use user::{CreateUserRequest, UpdateUserRequest};
pub use error::{SharedError, Validate};
