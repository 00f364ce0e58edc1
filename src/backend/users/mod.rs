//! Users Module
//!
//! Account management (`/user`) on top of the user store in `auth::users`.

pub mod handlers;
pub mod service;
