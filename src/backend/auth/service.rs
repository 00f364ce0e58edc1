/**
 * Auth Service
 *
 * Registration and login. Both return the stored user together with a
 * freshly signed token.
 *
 * # Registration Process
 *
 * 1. Check that the email is not already registered
 * 2. Hash the password with the configured bcrypt cost
 * 3. Create the user
 * 4. Sign a JWT token for the new user
 *
 * # Login Process
 *
 * 1. Look up the user by email (400 when unknown)
 * 2. Verify the password (401 when it does not match)
 * 3. Sign a JWT token
 */

use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::{LoginRequest, RegisterRequest};
use crate::backend::auth::passwords::{hash_password, verify_password};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{create_user, get_user_by_email, is_unique_violation, User};
use crate::backend::error::BackendError;
use crate::backend::server::config::AppConfig;

pub const EMAIL_TAKEN: &str = "User with this email already exists!";
pub const UNKNOWN_EMAIL: &str = "User with this email does not exist";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

fn sign(config: &AppConfig, user: &User) -> Result<String, BackendError> {
    create_token(config, user.id).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        BackendError::internal("Failed to create token")
    })
}

/// Register a new account
pub async fn register(
    pool: &SqlitePool,
    config: &AppConfig,
    request: RegisterRequest,
) -> Result<(User, String), BackendError> {
    if get_user_by_email(pool, &request.email).await?.is_some() {
        tracing::warn!("Email already registered: {}", request.email);
        return Err(BackendError::bad_request(EMAIL_TAKEN));
    }

    let password_hash = hash_password(request.password, config.bcrypt_cost).await?;

    let user = create_user(pool, &request.email, &password_hash, &request.display_name)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                tracing::warn!("Email registered concurrently: {}", request.email);
                BackendError::bad_request(EMAIL_TAKEN)
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                BackendError::Database(e)
            }
        })?;

    let token = sign(config, &user)?;
    tracing::info!("User registered: {} ({})", user.id, user.email);

    Ok((user, token))
}

/// Authenticate with email and password
pub async fn login(
    pool: &SqlitePool,
    config: &AppConfig,
    request: LoginRequest,
) -> Result<(User, String), BackendError> {
    let user = get_user_by_email(pool, &request.email)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Login for unknown email: {}", request.email);
            BackendError::bad_request(UNKNOWN_EMAIL)
        })?;

    let valid = verify_password(request.password, user.password_hash.clone()).await?;
    if !valid {
        tracing::warn!("Invalid password for user: {}", user.id);
        return Err(BackendError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = sign(config, &user)?;
    tracing::info!("User logged in: {}", user.id);

    Ok((user, token))
}
