//! User Request Types
//!
//! Request bodies for the `/user` management endpoints. The public user view
//! returned by every endpoint lives in `backend::auth::handlers::types`.

use serde::{Deserialize, Serialize};

use crate::shared::error::{require_email, require_non_blank, SharedError, Validate};

/// Minimum password length accepted anywhere a password is set
pub const MIN_PASSWORD_LEN: usize = 8;

/// Request to create a user directly (outside of registration)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    /// Plain password, hashed before storage
    pub password: String,
    pub display_name: String,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), SharedError> {
        require_email("email", &self.email)?;
        require_password("password", &self.password)?;
        require_non_blank("displayName", &self.display_name)?;
        Ok(())
    }
}

/// Partial profile update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), SharedError> {
        if let Some(email) = &self.email {
            require_email("email", email)?;
        }
        if let Some(password) = &self.password {
            require_password("password", password)?;
        }
        if let Some(display_name) = &self.display_name {
            require_non_blank("displayName", display_name)?;
        }
        Ok(())
    }
}

/// Passwords must be at least [`MIN_PASSWORD_LEN`] characters
pub fn require_password(field: &str, value: &str) -> Result<(), SharedError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(SharedError::validation(
            field,
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}
