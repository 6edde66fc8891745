//! Chat and Message API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::TestApp;

async fn chats_of(app: &TestApp, token: &str) -> Vec<String> {
    let body: Value = app
        .server
        .get("/api/v1/users/@me")
        .authorization_bearer(token)
        .await
        .json();
    body["chats"]
        .as_array()
        .expect("chats array")
        .iter()
        .map(|c| c.as_str().expect("chat id").to_string())
        .collect()
}

#[tokio::test]
async fn test_pair_chat_links_both_participants() {
    let app = TestApp::new();
    let alice = app.register_user().await;
    let bob = app.register_user().await;

    let chat = app.create_chat(&alice, &[&bob]).await;
    let chat_id = chat["id"].as_str().unwrap().to_string();

    assert_eq!(chat["is_group"], false);
    assert_eq!(chat["name"], bob.display_name.as_str());
    assert_eq!(chat["participants"], json!([alice.id, bob.id]));
    assert_eq!(chats_of(&app, &alice.token).await, vec![chat_id.clone()]);
    assert_eq!(chats_of(&app, &bob.token).await, vec![chat_id]);
}

#[tokio::test]
async fn test_pair_chat_is_reused() {
    let app = TestApp::new();
    let alice = app.register_user().await;
    let bob = app.register_user().await;

    let first = app.create_chat(&alice, &[&bob]).await;
    let second = app.create_chat(&alice, &[&bob]).await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(app.store.chat_count(), 1);
    assert_eq!(chats_of(&app, &bob.token).await.len(), 1);
}

#[tokio::test]
async fn test_group_chat_keeps_requested_name() {
    let app = TestApp::new();
    let alice = app.register_user().await;
    let bob = app.register_user().await;
    let carol = app.register_user().await;

    let response = app
        .server
        .post("/api/v1/chats")
        .authorization_bearer(&alice.token)
        .json(&json!({ "participants": [bob.id, carol.id], "name": "weekend plans" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let chat: Value = response.json();
    assert_eq!(chat["is_group"], true);
    assert_eq!(chat["name"], "weekend plans");
    assert_eq!(chat["participants"].as_array().unwrap().len(), 3);
    for user in [&alice, &bob, &carol] {
        assert_eq!(chats_of(&app, &user.token).await, vec![chat["id"].as_str().unwrap().to_string()]);
    }
}

#[tokio::test]
async fn test_duplicate_participants_create_nothing() {
    let app = TestApp::new();
    let alice = app.register_user().await;
    let bob = app.register_user().await;

    let response = app
        .server
        .post("/api/v1/chats")
        .authorization_bearer(&alice.token)
        .json(&json!({ "participants": [alice.id, bob.id, alice.id] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(app.store.chat_count(), 0);
    assert!(chats_of(&app, &alice.token).await.is_empty());
    assert!(chats_of(&app, &bob.token).await.is_empty());
}

#[tokio::test]
async fn test_chat_with_only_self_is_rejected() {
    let app = TestApp::new();
    let alice = app.register_user().await;

    let response = app
        .server
        .post("/api/v1/chats")
        .authorization_bearer(&alice.token)
        .json(&json!({ "participants": [alice.id] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(app.store.chat_count(), 0);
}

#[tokio::test]
async fn test_unknown_participant_is_not_found() {
    let app = TestApp::new();
    let alice = app.register_user().await;

    let response = app
        .server
        .post("/api/v1/chats")
        .authorization_bearer(&alice.token)
        .json(&json!({ "participants": ["123456789"] }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(app.store.chat_count(), 0);
}

#[tokio::test]
async fn test_non_participant_cannot_read_chat() {
    let app = TestApp::new();
    let alice = app.register_user().await;
    let bob = app.register_user().await;
    let mallory = app.register_user().await;
    let chat = app.create_chat(&alice, &[&bob]).await;
    let chat_id = chat["id"].as_str().unwrap();

    app.server
        .get(&format!("/api/v1/chats/{chat_id}"))
        .authorization_bearer(&mallory.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .get(&format!("/api/v1/chats/{chat_id}/messages"))
        .authorization_bearer(&mallory.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_chat_is_not_found() {
    let app = TestApp::new();
    let alice = app.register_user().await;

    app.server
        .get("/api/v1/chats/987654321")
        .authorization_bearer(&alice.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_messages_are_returned_in_send_order() {
    let app = TestApp::new();
    let alice = app.register_user().await;
    let bob = app.register_user().await;
    let chat = app.create_chat(&alice, &[&bob]).await;
    let chat_id = chat["id"].as_str().unwrap();

    for (user, body) in [(&alice, "hi bob"), (&bob, "hi alice"), (&alice, "lunch?")] {
        let response = app
            .server
            .post(&format!("/api/v1/chats/{chat_id}/messages"))
            .authorization_bearer(&user.token)
            .json(&json!({ "body": body }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let message: Value = response.json();
        assert_eq!(message["sender_id"], user.id.as_str());
        assert!(message["arrival_time"].is_string());
    }

    let history: Vec<Value> = app
        .server
        .get(&format!("/api/v1/chats/{chat_id}/messages"))
        .authorization_bearer(&bob.token)
        .await
        .json();
    let bodies: Vec<&str> = history.iter().map(|m| m["body"].as_str().unwrap()).collect();
    assert_eq!(bodies, vec!["hi bob", "hi alice", "lunch?"]);

    let chat: Value = app
        .server
        .get(&format!("/api/v1/chats/{chat_id}"))
        .authorization_bearer(&alice.token)
        .await
        .json();
    assert_eq!(chat["message_count"], 3);
}

#[tokio::test]
async fn test_blank_message_is_rejected() {
    let app = TestApp::new();
    let alice = app.register_user().await;
    let bob = app.register_user().await;
    let chat = app.create_chat(&alice, &[&bob]).await;
    let chat_id = chat["id"].as_str().unwrap();

    app.server
        .post(&format!("/api/v1/chats/{chat_id}/messages"))
        .authorization_bearer(&alice.token)
        .json(&json!({ "body": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reconcile_consistent_chat_repairs_nothing() {
    let app = TestApp::new();
    let alice = app.register_user().await;
    let bob = app.register_user().await;
    let chat = app.create_chat(&alice, &[&bob]).await;
    let chat_id = chat["id"].as_str().unwrap();

    let response = app
        .server
        .post(&format!("/api/v1/chats/{chat_id}/reconcile"))
        .authorization_bearer(&alice.token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["chat_id"], chat_id);
    assert_eq!(body["repaired"], json!([]));
}
