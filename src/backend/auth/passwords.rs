/**
 * Password Hashing
 *
 * bcrypt is deliberately slow, so hashing and verification run on the
 * blocking thread pool instead of stalling the async executor.
 */

use crate::backend::error::BackendError;

/// Hash a plain password with the given bcrypt cost
pub async fn hash_password(password: String, cost: u32) -> Result<String, BackendError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {:?}", e);
            BackendError::internal("Password hashing task failed")
        })?
        .map_err(|e| {
            tracing::error!("Failed to hash password: {:?}", e);
            BackendError::internal("Failed to hash password")
        })
}

/// Check a plain password against a stored bcrypt hash
pub async fn verify_password(password: String, password_hash: String) -> Result<bool, BackendError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {:?}", e);
            BackendError::internal("Password verification task failed")
        })?
        .map_err(|e| {
            tracing::error!("Password verification error: {:?}", e);
            BackendError::internal("Password verification failed")
        })
}
