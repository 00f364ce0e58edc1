//! Authentication Module
//!
//! This module handles user registration, login, password hashing and JWT
//! session tokens.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model and database operations
//! ├── passwords.rs    - bcrypt hashing on the blocking pool
//! ├── sessions.rs     - JWT token management
//! ├── service.rs      - Registration and login rules
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Register**: email, password, display name → user created → JWT token returned
//! 2. **Login**: email and password → credentials verified → JWT token returned
//! 3. **Protected routes**: `Authorization: Bearer <token>` → token verified by
//!    `middleware::auth` → caller identity available to handlers
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt with the configured cost before storage
//! - JWT tokens are used for stateless authentication
//! - Tokens expire after the configured lifetime (`JWT_EXPIRES_IN`, default 7 days)

/// User data model and database operations
pub mod users;

/// Password hashing
pub mod passwords;

/// JWT token generation and validation
pub mod sessions;

/// Registration and login
pub mod service;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::types::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
pub use handlers::{login, register};
