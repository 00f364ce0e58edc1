/**
 * Authentication Handler Types
 *
 * Request and response bodies for the `/auth` endpoints. [`UserResponse`]
 * is also the public user view returned by the `/user` endpoints.
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::auth::users::User;
use crate::shared::error::{require_email, require_non_blank, SharedError, Validate};
use crate::shared::user::require_password;

/// Registration request
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// User's email address
    pub email: String,
    /// User's password (will be hashed before storage)
    pub password: String,
    /// Name shown to other users
    pub display_name: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), SharedError> {
        require_email("email", &self.email)?;
        require_password("password", &self.password)?;
        require_non_blank("displayName", &self.display_name)?;
        Ok(())
    }
}

/// Login request
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    /// User's password (will be verified against stored hash)
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), SharedError> {
        require_non_blank("email", &self.email)?;
        require_non_blank("password", &self.password)?;
        Ok(())
    }
}

/// Auth response
///
/// Returned by register and login. Contains the JWT token and the public
/// user view for immediate authentication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub user: UserResponse,
    /// JWT token for authentication
    pub token: String,
}

/// User response (without sensitive data)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_user_response_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            password_hash: "$2b$04$secret".to_string(),
            display_name: "Ada".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(json["displayName"], "Ada");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_register_request_validation() {
        let ok: RegisterRequest = serde_json::from_str(
            r#"{"email":"ada@example.com","password":"password123","displayName":"Ada"}"#,
        )
        .unwrap();
        assert!(ok.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "ada".to_string(),
            ..ok.clone()
        };
        assert!(bad_email.validate().is_err());

        let short = RegisterRequest {
            password: "1234567".to_string(),
            ..ok
        };
        assert!(short.validate().is_err());
    }
}
