//! Common test utilities and helpers
//!
//! - Test application and database fixtures
//! - Authentication helpers
//! - Custom assertion macros

#![allow(dead_code)]

#[macro_use]
pub mod assertions;
pub mod auth_helpers;
pub mod database;

pub use auth_helpers::*;
pub use database::*;
