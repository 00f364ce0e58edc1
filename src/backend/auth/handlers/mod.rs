//! Authentication Handlers Module
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── types.rs     - Request and response types
//! ├── register.rs  - User registration handler
//! └── login.rs     - User authentication handler
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /auth/register - User registration (201)
//! - **`login`** - POST /auth/login - User authentication
//!
//! # Example
//!
//! ```rust,no_run
//! use love_letters::backend::auth::handlers::{login, register};
//! use love_letters::backend::server::state::AppState;
//! use axum::{routing::post, Router};
//!
//! let router: Router<AppState> = Router::new()
//!     .route("/auth/register", post(register))
//!     .route("/auth/login", post(login));
//! ```

/// Request and response types
pub mod types;

/// Register handler
pub mod register;

/// Login handler
pub mod login;

pub use types::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

pub use login::login;
pub use register::register;
