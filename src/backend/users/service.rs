/**
 * User Service
 *
 * Account management behind the `/user` routes. Every operation returns
 * the public user view; password hashes never leave this layer.
 */

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::auth::passwords::hash_password;
use crate::backend::auth::service::EMAIL_TAKEN;
use crate::backend::auth::users::{self, is_unique_violation, UserChanges};
use crate::backend::error::BackendError;
use crate::backend::server::config::AppConfig;
use crate::shared::{CreateUserRequest, UpdateUserRequest};

const USER_NOT_FOUND: &str = "User not found";

fn map_write_error(e: sqlx::Error) -> BackendError {
    if is_unique_violation(&e) {
        BackendError::bad_request(EMAIL_TAKEN)
    } else {
        BackendError::Database(e)
    }
}

pub async fn create_user(
    pool: &SqlitePool,
    config: &AppConfig,
    request: CreateUserRequest,
) -> Result<UserResponse, BackendError> {
    let password_hash = hash_password(request.password, config.bcrypt_cost).await?;
    let user = users::create_user(pool, &request.email, &password_hash, &request.display_name)
        .await
        .map_err(map_write_error)?;

    tracing::info!("User created: {} ({})", user.id, user.email);
    Ok(user.into())
}

pub async fn get_user(pool: &SqlitePool, id: Uuid) -> Result<UserResponse, BackendError> {
    users::get_user_by_id(pool, id)
        .await?
        .map(UserResponse::from)
        .ok_or_else(|| BackendError::not_found(USER_NOT_FOUND))
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserResponse>, BackendError> {
    Ok(users::list_users(pool)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect())
}

/// Users whose display name contains `name`, excluding the caller
pub async fn search_users(
    pool: &SqlitePool,
    name: &str,
    caller: Uuid,
) -> Result<Vec<UserResponse>, BackendError> {
    Ok(users::search_users_by_display_name(pool, name, caller)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect())
}

pub async fn update_user(
    pool: &SqlitePool,
    config: &AppConfig,
    id: Uuid,
    request: UpdateUserRequest,
) -> Result<UserResponse, BackendError> {
    let password_hash = match request.password {
        Some(password) => Some(hash_password(password, config.bcrypt_cost).await?),
        None => None,
    };

    let changes = UserChanges {
        email: request.email,
        password_hash,
        display_name: request.display_name,
    };

    let user = users::update_user(pool, id, changes)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| BackendError::not_found(USER_NOT_FOUND))?;

    tracing::info!("User updated: {}", user.id);
    Ok(user.into())
}

/// Delete a user; their letters are removed by the database cascade
pub async fn delete_user(pool: &SqlitePool, id: Uuid) -> Result<UserResponse, BackendError> {
    let user = users::delete_user(pool, id)
        .await?
        .ok_or_else(|| BackendError::not_found(USER_NOT_FOUND))?;

    tracing::info!("User deleted: {}", user.id);
    Ok(user.into())
}
