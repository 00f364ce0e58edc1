//! HTTP handlers for `/user`
//!
//! All routes require authentication.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::error::BackendError;
use crate::backend::extract::{JsonBody, PathId};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::users::service;
use crate::shared::{CreateUserRequest, UpdateUserRequest};

/// GET /user
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, BackendError> {
    Ok(Json(service::list_users(&state.db).await?))
}

/// POST /user
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), BackendError> {
    let user = service::create_user(&state.db, &state.config, request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /user/{id}
pub async fn get_user(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<UserResponse>, BackendError> {
    Ok(Json(service::get_user(&state.db, id).await?))
}

/// PATCH /user/{id}
pub async fn update_user(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(request): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserResponse>, BackendError> {
    Ok(Json(service::update_user(&state.db, &state.config, id, request).await?))
}

/// DELETE /user/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<UserResponse>, BackendError> {
    Ok(Json(service::delete_user(&state.db, id).await?))
}

/// GET /user/search/{name}
pub async fn search_users(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(name): Path<String>,
) -> Result<Json<Vec<UserResponse>>, BackendError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BackendError::validation("name", "must not be empty"));
    }
    Ok(Json(service::search_users(&state.db, name, user.user_id).await?))
}
