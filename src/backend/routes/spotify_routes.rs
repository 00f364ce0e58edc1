//! `/spotify` routes
//!
//! `login` and `callback` are reached by the browser during the OAuth
//! redirect and stay public; everything else needs a bearer token.

use axum::{
    routing::{get, post},
    Router,
};

use crate::backend::server::state::AppState;
use crate::backend::spotify::handlers;

pub fn spotify_public_routes() -> Router<AppState> {
    Router::new()
        .route("/spotify/login", get(handlers::login))
        .route("/spotify/callback", get(handlers::callback))
}

pub fn spotify_routes() -> Router<AppState> {
    Router::new()
        .route("/spotify/refresh", post(handlers::refresh))
        .route("/spotify/search", get(handlers::search))
        .route("/spotify/song", get(handlers::song))
        .route("/spotify/me", get(handlers::me))
}
