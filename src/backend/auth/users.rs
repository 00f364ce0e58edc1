/**
 * User Model and Database Operations
 *
 * This module handles user data and database operations. Every function
 * takes the pool explicitly and returns raw `sqlx` errors; mapping them to
 * HTTP errors is the job of the services above.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

/// User struct representing a user in the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// User email address (unique)
    pub email: String,
    /// Hashed password (bcrypt)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Name shown to other users
    pub display_name: String,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    pub updated_at: DateTime<Utc>,
}

/// Profile fields to change; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
}

const USER_COLUMNS: &str = "id, email, password_hash, display_name, created_at, updated_at";

/// Check whether a database error is a UNIQUE constraint violation
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Create a new user
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    display_name: &str,
) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, email, password_hash, display_name, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(display_name)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Get user by email
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Get user by ID
pub async fn get_user_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// List every user ordered by display name
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY display_name, email"
    ))
    .fetch_all(pool)
    .await
}

/// Find users whose display name contains `name`, ignoring case
///
/// The caller's own account is excluded. Case folding is SQLite's `lower`,
/// which only folds ASCII letters.
pub async fn search_users_by_display_name(
    pool: &SqlitePool,
    name: &str,
    exclude: Uuid,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE id != ? AND instr(lower(display_name), lower(?)) > 0
        ORDER BY display_name, email
        "#
    ))
    .bind(exclude)
    .bind(name)
    .fetch_all(pool)
    .await
}

/// Apply profile changes, returning `None` when the user does not exist
pub async fn update_user(
    pool: &SqlitePool,
    id: Uuid,
    changes: UserChanges,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET email = COALESCE(?, email),
            password_hash = COALESCE(?, password_hash),
            display_name = COALESCE(?, display_name),
            updated_at = ?
        WHERE id = ?
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(changes.email)
    .bind(changes.password_hash)
    .bind(changes.display_name)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Delete a user, returning the removed row
///
/// Letters written by or addressed to the user go with it (`ON DELETE CASCADE`).
pub async fn delete_user(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "DELETE FROM users WHERE id = ? RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}
