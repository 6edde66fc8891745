//! Message entity and repository trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Maximum message body length in characters
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// A persisted chat message.
///
/// Maps to the `messages` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - chat_id: BIGINT NOT NULL REFERENCES chats(id)
/// - sender_id: BIGINT NOT NULL
/// - body: TEXT NOT NULL
/// - arrival_time: TIMESTAMPTZ NOT NULL
/// - recipient_id: BIGINT NULL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub body: String,

    /// Set by the server when the message is received, before it is stored.
    /// Not ordered across concurrent senders.
    pub arrival_time: DateTime<Utc>,

    /// Direct recipient for live relay; `None` for chat-wide messages.
    pub recipient_id: Option<i64>,
}

/// Repository trait for Message data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Insert a new message document.
    async fn insert(&self, message: &Message) -> Result<Message, AppError>;

    /// Messages of one chat, oldest first, at most `limit`, optionally only
    /// those with an id lower than `before`.
    async fn find_by_chat(
        &self,
        chat_id: i64,
        before: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Message>, AppError>;
}
