/**
 * API Route Tables
 *
 * ## Public
 * - `POST /auth/register` - User registration
 * - `POST /auth/login` - User login
 *
 * ## Authenticated
 * - `POST /letter`, `PATCH /letter/{id}`, `POST /letter/{id}/send`
 * - `GET /letter/drafts`, `/letter/sent`, `/letter/sent/{id}`,
 *   `/letter/received`, `/letter/received/{id}`
 * - `GET|POST /user`, `GET|PATCH|DELETE /user/{id}`, `GET /user/search/{name}`
 *
 * Authentication is applied by the caller (see `router::create_router`).
 */

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::backend::auth::handlers::{login, register};
use crate::backend::letters::handlers as letters;
use crate::backend::server::state::AppState;
use crate::backend::users::handlers as users;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn letter_routes() -> Router<AppState> {
    Router::new()
        .route("/letter", post(letters::create_letter))
        .route("/letter/{id}", patch(letters::edit_letter))
        .route("/letter/{id}/send", post(letters::send_letter))
        .route("/letter/drafts", get(letters::list_drafts))
        .route("/letter/sent", get(letters::list_sent))
        .route("/letter/sent/{id}", get(letters::get_sent))
        .route("/letter/received", get(letters::list_received))
        .route("/letter/received/{id}", get(letters::get_received))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(users::list_users).post(users::create_user))
        .route(
            "/user/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/user/search/{name}", get(users::search_users))
}
