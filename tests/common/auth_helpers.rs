//! Authentication test helpers
//!
//! Users are registered through the real `/auth/register` endpoint so their
//! tokens are exactly what a client would hold.

use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use super::database::TestApp;

/// Registered test user
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub token: String,
}

pub const TEST_PASSWORD: &str = "test_password_123";

/// Register a user through the API
pub async fn register_user(app: &TestApp, email: &str, display_name: &str) -> TestUser {
    let response = app
        .server
        .post("/auth/register")
        .json(&json!({
            "email": email,
            "password": TEST_PASSWORD,
            "displayName": display_name,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED, "{}", response.text());

    let body: Value = response.json();
    TestUser {
        id: body["user"]["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("register response carries a user id"),
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
        display_name: display_name.to_string(),
        token: body["token"].as_str().expect("register response carries a token").to_string(),
    }
}
