//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use std::sync::Arc;

use axum_test::TestServer;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::{json, Value};
use uuid::Uuid;

use chat_hub::config::{
    CorsSettings, DatabaseSettings, JwtSettings, ServerSettings, Settings, SnowflakeSettings,
    StorageBackend, StorageSettings, WebSocketSettings,
};
use chat_hub::infrastructure::repositories::{InMemoryStore, Repositories};
use chat_hub::startup::{build_router, AppState};

pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Settings for an in-memory instance.
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        storage: StorageSettings {
            backend: StorageBackend::Memory,
        },
        database: DatabaseSettings {
            url: String::new(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: 1,
            run_migrations: false,
        },
        jwt: JwtSettings {
            secret: "integration-test-secret-with-32-plus-chars".into(),
            access_token_expiry_minutes: 15,
        },
        snowflake: SnowflakeSettings {
            machine_id: 7,
            epoch: chat_hub::shared::snowflake::DEFAULT_EPOCH,
        },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        websocket: WebSocketSettings::default(),
        environment: "test".into(),
    }
}

/// Test application over the in-memory store
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
}

/// A registered account
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::new(test_settings(), Repositories::in_memory(store.clone()));
        let server = TestServer::new(build_router(state.clone())).expect("failed to start test server");

        Self {
            server,
            state,
            store,
        }
    }

    /// Register a user with fake profile data.
    pub async fn register_user(&self) -> TestUser {
        // Prefix keeps fake emails unique within one test.
        let email = format!("{}+{}", &Uuid::new_v4().simple().to_string()[..8], SafeEmail().fake::<String>());
        let display_name: String = Name().fake();

        let response = self
            .server
            .post("/api/v1/auth/register")
            .json(&json!({
                "email": email,
                "display_name": display_name,
                "password": TEST_PASSWORD,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: Value = response.json();
        TestUser {
            id: body["user"]["id"].as_str().expect("user id").to_string(),
            email: body["user"]["email"].as_str().expect("email").to_string(),
            display_name,
            token: body["access_token"].as_str().expect("token").to_string(),
        }
    }

    /// Create a chat as `creator` with the given other participants.
    pub async fn create_chat(&self, creator: &TestUser, others: &[&TestUser]) -> Value {
        let participants: Vec<&str> = others.iter().map(|u| u.id.as_str()).collect();
        let response = self
            .server
            .post("/api/v1/chats")
            .authorization_bearer(&creator.token)
            .json(&json!({ "participants": participants }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }
}
