//! Letters Module
//!
//! Drafting, sending, scheduling and reading letters.
//!
//! # Module Structure
//!
//! ```text
//! letters/
//! ├── mod.rs       - Module exports
//! ├── db.rs        - SQL for the letters table
//! ├── service.rs   - Lifecycle state machine and access rules
//! ├── uploads.rs   - Photo/song attachments on local disk
//! └── handlers.rs  - HTTP handlers under /letter
//! ```

pub mod db;
pub mod handlers;
pub mod service;
pub mod uploads;
