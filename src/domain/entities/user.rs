//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Represents a user account in the chat system.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - display_name: VARCHAR(64) NOT NULL
/// - password_hash: VARCHAR(255) NOT NULL
/// - avatar_url: TEXT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - chat_ids: BIGINT[] NOT NULL DEFAULT '{}'
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Email address (unique)
    pub email: String,

    /// Name shown to other participants
    pub display_name: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// URL to user's avatar image
    pub avatar_url: Option<String>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Chats this user belongs to. Set semantics, order is irrelevant.
    /// Only the membership coordinator writes this field.
    #[serde(default)]
    pub chats: Vec<i64>,
}

impl User {
    /// Whether this user's back-reference includes `chat_id`.
    pub fn is_in_chat(&self, chat_id: i64) -> bool {
        self.chats.contains(&chat_id)
    }
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: 0,
            email: String::new(),
            display_name: String::new(),
            password_hash: String::new(),
            avatar_url: None,
            created_at: Utc::now(),
            chats: Vec::new(),
        }
    }
}

/// Repository trait for User data access operations.
///
/// Every method is a single-document operation; there is no way to group
/// several calls into one atomic unit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Create a new user. Fails with `Conflict` when the email is taken.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Add `chat_id` to the user's `chats` set.
    ///
    /// Atomic on the one document and idempotent. Returns `false` when the
    /// user does not exist.
    async fn add_chat(&self, user_id: i64, chat_id: i64) -> Result<bool, AppError>;

    /// Cheap connectivity probe used by readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}
