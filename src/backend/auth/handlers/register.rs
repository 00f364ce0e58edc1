/**
 * Register Handler
 *
 * POST /auth/register
 *
 * # Validation
 *
 * - Email must look like an address
 * - Password must be at least 8 characters long
 * - Display name must not be empty
 * - Email must be unique
 *
 * # Example Request
 *
 * ```http
 * POST /auth/register HTTP/1.1
 * Content-Type: application/json
 *
 * {"email": "user@example.com", "password": "securepassword123", "displayName": "Ada"}
 * ```
 *
 * # Example Response (201)
 *
 * ```json
 * {
 *   "user": {"id": "123e4567-e89b-12d3-a456-426614174000", "email": "user@example.com", "displayName": "Ada"},
 *   "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9..."
 * }
 * ```
 */

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::{AuthResponse, RegisterRequest};
use crate::backend::auth::service;
use crate::backend::error::BackendError;
use crate::backend::extract::JsonBody;
use crate::backend::server::config::AppConfig;

pub async fn register(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<AppConfig>>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), BackendError> {
    tracing::info!("Register request for email: {}", request.email);

    let (user, token) = service::register(&pool, &config, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}
