//! Authentication API Tests

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::{TestApp, TEST_PASSWORD};

#[tokio::test]
async fn test_register_with_valid_data() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "email": "Alice@Example.com",
            "display_name": "Alice",
            "password": TEST_PASSWORD,
            "avatar_url": "https://cdn.example.com/alice.png",
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["display_name"], "Alice");
    assert_eq!(body["user"]["chats"], json!([]));
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_with_invalid_email_fails() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "email": "not-an-email",
            "display_name": "Bob",
            "password": TEST_PASSWORD,
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], 10007);
    assert_eq!(body["errors"][0]["field"], "email");
}

#[tokio::test]
async fn test_register_with_short_password_fails() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "email": "carol@example.com",
            "display_name": "Carol",
            "password": "short",
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = TestApp::new();
    let user = app.register_user().await;

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "email": user.email,
            "display_name": "Someone Else",
            "password": TEST_PASSWORD,
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let app = TestApp::new();
    let user = app.register_user().await;

    let response = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": user.email, "password": TEST_PASSWORD }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["id"], user.id.as_str());
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_login_with_wrong_password_fails() {
    let app = TestApp::new();
    let user = app.register_user().await;

    let response = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": user.email, "password": "WrongPassword123" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::new();

    app.server
        .get("/api/v1/users/@me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .get("/api/v1/users/@me")
        .authorization_bearer("garbage")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_current_user_profile() {
    let app = TestApp::new();
    let user = app.register_user().await;

    let response = app
        .server
        .get("/api/v1/users/@me")
        .authorization_bearer(&user.token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["id"], user.id.as_str());
    assert_eq!(body["email"], user.email.as_str());
}

#[tokio::test]
async fn test_other_user_profile_is_public_view() {
    let app = TestApp::new();
    let alice = app.register_user().await;
    let bob = app.register_user().await;

    let response = app
        .server
        .get(&format!("/api/v1/users/{}", bob.id))
        .authorization_bearer(&alice.token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["display_name"], bob.display_name.as_str());
    assert!(body.get("email").is_none());
    assert!(body.get("chats").is_none());
}
