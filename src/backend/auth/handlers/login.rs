/**
 * Login Handler
 *
 * POST /auth/login
 *
 * # Errors
 *
 * * `400 Bad Request` - malformed body, or no user with this email
 * * `401 Unauthorized` - password does not match
 *
 * Passwords are never logged or returned in responses.
 */

use std::sync::Arc;

use axum::{extract::State, response::Json};
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::service;
use crate::backend::error::BackendError;
use crate::backend::extract::JsonBody;
use crate::backend::server::config::AppConfig;

pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<AppConfig>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    tracing::info!("Login request for: {}", request.email);

    let (user, token) = service::login(&pool, &config, request).await?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}
