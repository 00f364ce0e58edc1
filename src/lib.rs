//! Love Letters - Main Library
//!
//! REST backend for writing letters to other users and delivering them now
//! or on a chosen date. A letter can carry a song (a Spotify link or an
//! uploaded audio file) and a photo.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared by server and clients
//!   - Letters, lifecycle status, request payloads
//!   - User payloads
//!   - Validation errors
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server, JWT authentication, rate limiting
//!   - SQLite persistence through sqlx
//!   - Spotify Web API proxy
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend modules and the server binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use love_letters::backend::server::{config::{load_database, AppConfig}, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let pool = load_database(&config.database_url).await?;
//! let app = create_app(config, pool);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:4000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod shared;

#[cfg(feature = "ssr")]
pub mod backend;
