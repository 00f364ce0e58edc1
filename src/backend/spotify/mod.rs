//! Spotify Integration
//!
//! OAuth login flow and a thin proxy over the Spotify Web API so the
//! frontend can attach songs to letters.
//!
//! - **`client`** - reqwest client for the accounts service and Web API
//! - **`handlers`** - HTTP handlers under `/spotify`

pub mod client;
pub mod handlers;

pub use client::SpotifyClient;
