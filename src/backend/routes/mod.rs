//! Route Configuration Module
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs             - Module exports
//! ├── router.rs          - Router assembly and middleware stack
//! ├── api_routes.rs      - Auth, letter and user route tables
//! └── spotify_routes.rs  - Spotify route tables
//! ```

/// Main router creation
pub mod router;

/// Auth, letter and user routes
pub mod api_routes;

/// Spotify routes
pub mod spotify_routes;

pub use router::create_router;
