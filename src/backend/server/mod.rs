//! Server Module
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Environment configuration and database loading
//! └── init.rs         - App creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `AppConfig::from_env`
//! 2. **Database**: `load_database` opens the SQLite pool and runs migrations
//! 3. **State Creation**: `AppState::new` builds the Spotify client and rate limiter
//! 4. **Router Creation**: `create_app` configures all routes and middleware
//!
//! # Example
//!
//! ```rust,no_run
//! use love_letters::backend::server::{config::{load_database, AppConfig}, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let pool = load_database(&config.database_url).await?;
//! let app = create_app(config, pool);
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use init::create_app;
pub use state::AppState;
