//! Backend Module
//!
//! Axum HTTP server for the Love Letters API: accounts and authentication,
//! the letter lifecycle (draft, scheduled, sent, opened), user management
//! and a proxy for the Spotify Web API.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, app creation
//! - **`routes`** - Route tables and the middleware stack
//! - **`auth`** - User store, password hashing, JWT sessions, register/login
//! - **`letters`** - Letter persistence, lifecycle rules, uploads
//! - **`users`** - `/user` account management
//! - **`spotify`** - OAuth flow and Web API proxy
//! - **`middleware`** - Bearer token authentication and rate limiting
//! - **`extract`** - Validating request extractors
//! - **`error`** - `BackendError` and its HTTP rendering
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs
//! ├── main.rs         - Binary entry point
//! ├── server/
//! ├── routes/
//! ├── auth/
//! ├── letters/
//! ├── users/
//! ├── spotify/
//! ├── middleware/
//! ├── extract.rs
//! └── error/
//! ```
//!
//! # State
//!
//! Handlers share an `AppState` holding the SQLite pool, the loaded
//! `AppConfig`, the optional Spotify client and the rate limiter. There are
//! no background tasks: scheduled letters become visible because reads
//! compare the stored delivery date with the current time.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Authentication and user storage
pub mod auth;

/// Letters
pub mod letters;

/// User management
pub mod users;

/// Spotify integration
pub mod spotify;

/// Middleware for request processing
pub mod middleware;

/// Request extractors
pub mod extract;

/// Backend error types
pub mod error;
