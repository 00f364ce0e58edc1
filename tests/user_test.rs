//! User management integration tests

#![cfg(feature = "ssr")]

#[macro_use]
mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{register_user, TestApp};

#[tokio::test]
async fn test_list_users_sorted_by_display_name() {
    let app = TestApp::new().await;
    let zoe = register_user(&app, "zoe@example.com", "Zoe").await;
    register_user(&app, "adam@example.com", "Adam").await;

    let response = app.server.get("/user").authorization_bearer(&zoe.token).await;

    assert_status!(response, StatusCode::OK);
    let users: Value = response.json();
    let names: Vec<&str> = users
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["displayName"].as_str())
        .collect();
    assert_eq!(names, vec!["Adam", "Zoe"]);
    assert!(users[0].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_create_and_get_user() {
    let app = TestApp::new().await;
    let admin = register_user(&app, "admin@example.com", "Admin").await;

    let response = app
        .server
        .post("/user")
        .authorization_bearer(&admin.token)
        .json(&json!({
            "email": "grace@example.com",
            "password": "password123",
            "displayName": "Grace"
        }))
        .await;

    assert_status!(response, StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["email"], "grace@example.com");

    let id = created["id"].as_str().unwrap();
    let fetched: Value = app
        .server
        .get(&format!("/user/{}", id))
        .authorization_bearer(&admin.token)
        .await
        .json();
    assert_eq!(fetched, created);

    // The created account can log in
    app.server
        .post("/auth/login")
        .json(&json!({ "email": "grace@example.com", "password": "password123" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_create_user_duplicate_email() {
    let app = TestApp::new().await;
    let admin = register_user(&app, "admin@example.com", "Admin").await;

    let response = app
        .server
        .post("/user")
        .authorization_bearer(&admin.token)
        .json(&json!({
            "email": "admin@example.com",
            "password": "password123",
            "displayName": "Copy"
        }))
        .await;

    assert_error_body!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_user() {
    let app = TestApp::new().await;
    let admin = register_user(&app, "admin@example.com", "Admin").await;

    let response = app
        .server
        .get(&format!("/user/{}", Uuid::new_v4()))
        .authorization_bearer(&admin.token)
        .await;
    assert_error_body!(response, StatusCode::NOT_FOUND);

    let response = app.server.get("/user/123").authorization_bearer(&admin.token).await;
    assert_error_body!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_user() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "ada@example.com", "Ada").await;

    let response = app
        .server
        .patch(&format!("/user/{}", ada.id))
        .authorization_bearer(&ada.token)
        .json(&json!({ "displayName": "Ada Lovelace", "password": "new-password-456" }))
        .await;

    assert_status!(response, StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["displayName"], "Ada Lovelace");
    assert_eq!(updated["email"], "ada@example.com");

    // The new password replaces the old one
    let response = app
        .server
        .post("/auth/login")
        .json(&json!({ "email": "ada@example.com", "password": ada.password }))
        .await;
    assert_error_body!(response, StatusCode::UNAUTHORIZED);

    app.server
        .post("/auth/login")
        .json(&json!({ "email": "ada@example.com", "password": "new-password-456" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_update_user_validation_and_conflicts() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "ada@example.com", "Ada").await;
    register_user(&app, "bob@example.com", "Bob").await;

    let path = format!("/user/{}", ada.id);

    let response = app
        .server
        .patch(&path)
        .authorization_bearer(&ada.token)
        .json(&json!({ "password": "short" }))
        .await;
    assert_error_body!(response, StatusCode::BAD_REQUEST);

    let response = app
        .server
        .patch(&path)
        .authorization_bearer(&ada.token)
        .json(&json!({ "email": "bob@example.com" }))
        .await;
    let message = assert_error_body!(response, StatusCode::BAD_REQUEST);
    assert_eq!(message, "User with this email already exists!");

    let response = app
        .server
        .patch(&format!("/user/{}", Uuid::new_v4()))
        .authorization_bearer(&ada.token)
        .json(&json!({ "displayName": "Nobody" }))
        .await;
    assert_error_body!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user() {
    let app = TestApp::new().await;
    let admin = register_user(&app, "admin@example.com", "Admin").await;
    let gone = register_user(&app, "gone@example.com", "Gone").await;

    let response = app
        .server
        .delete(&format!("/user/{}", gone.id))
        .authorization_bearer(&admin.token)
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.json::<Value>()["email"], "gone@example.com");

    let response = app
        .server
        .get(&format!("/user/{}", gone.id))
        .authorization_bearer(&admin.token)
        .await;
    assert_error_body!(response, StatusCode::NOT_FOUND);

    let response = app
        .server
        .delete(&format!("/user/{}", gone.id))
        .authorization_bearer(&admin.token)
        .await;
    assert_error_body!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user_removes_their_letters() {
    let app = TestApp::new().await;
    let alice = register_user(&app, "alice@example.com", "Alice").await;
    let bob = register_user(&app, "bob@example.com", "Bob").await;

    app.server
        .post("/letter")
        .authorization_bearer(&bob.token)
        .json(&json!({ "recipientId": alice.id, "content": "Bye" }))
        .await
        .assert_status(StatusCode::CREATED);

    app.server
        .delete(&format!("/user/{}", alice.id))
        .authorization_bearer(&bob.token)
        .await
        .assert_status_ok();

    let drafts: Value = app.server.get("/letter/drafts").authorization_bearer(&bob.token).await.json();
    assert_eq!(drafts, json!([]));
}

#[tokio::test]
async fn test_search_users_excludes_caller() {
    let app = TestApp::new().await;
    let anna = register_user(&app, "anna@example.com", "Anna").await;
    register_user(&app, "hannah@example.com", "Hannah").await;
    register_user(&app, "bob@example.com", "Bob").await;

    let response = app
        .server
        .get("/user/search/ANN")
        .authorization_bearer(&anna.token)
        .await;

    assert_status!(response, StatusCode::OK);
    let found: Value = response.json();
    let names: Vec<&str> = found
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["displayName"].as_str())
        .collect();
    assert_eq!(names, vec!["Hannah"]);
}

#[tokio::test]
async fn test_user_routes_require_auth() {
    let app = TestApp::new().await;

    let response = app.server.get("/user").await;
    assert_error_body!(response, StatusCode::UNAUTHORIZED);

    let response = app.server.get("/user/search/anyone").await;
    assert_error_body!(response, StatusCode::UNAUTHORIZED);
}
