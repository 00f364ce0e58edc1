//! Middleware Module
//!
//! This module contains the HTTP middleware for the backend server.
//!
//! - **`auth`** - Bearer-token authentication for protected routes
//! - **`rate_limit`** - Per-client token bucket rate limiting
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{middleware, Router};
//! use love_letters::backend::middleware::auth_middleware;
//! use love_letters::backend::server::state::AppState;
//!
//! fn protect(router: Router<AppState>, state: AppState) -> Router<AppState> {
//!     router.route_layer(middleware::from_fn_with_state(state, auth_middleware))
//! }
//! ```

pub mod auth;
pub mod rate_limit;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
pub use rate_limit::{rate_limit_middleware, RateLimiter};
