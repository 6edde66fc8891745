//! Chat entity and repository trait.
//!
//! Maps to the `chats` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A conversation between two users or a group.
///
/// Maps to the `chats` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - name: VARCHAR(100) NULL
/// - is_group: BOOLEAN NOT NULL
/// - participant_ids: BIGINT[] NOT NULL
/// - message_ids: BIGINT[] NOT NULL DEFAULT '{}'
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,

    /// For one-on-one chats, the display name of the second participant.
    pub name: Option<String>,

    pub is_group: bool,

    /// Distinct user ids in creation order. Never changes after creation.
    pub participants: Vec<i64>,

    /// Message ids in append order. Only grows.
    pub messages: Vec<i64>,

    pub created_at: DateTime<Utc>,
}

impl Chat {
    /// Build a new chat with an empty message list.
    pub fn new(id: i64, name: Option<String>, participants: Vec<i64>) -> Self {
        Self {
            id,
            name,
            is_group: participants.len() > 2,
            participants,
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn has_participant(&self, user_id: i64) -> bool {
        self.participants.contains(&user_id)
    }

    /// True when both chats involve exactly the same users, in any order.
    pub fn same_participants(&self, user_ids: &[i64]) -> bool {
        self.participants.len() == user_ids.len()
            && user_ids.iter().all(|id| self.has_participant(*id))
    }
}

/// Repository trait for Chat data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Insert a new chat document.
    async fn insert(&self, chat: &Chat) -> Result<Chat, AppError>;

    /// Find a chat by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Chat>, AppError>;

    /// Find a chat whose participant set equals `participants` (order-insensitive).
    async fn find_by_participants(&self, participants: &[i64]) -> Result<Option<Chat>, AppError>;

    /// Append `message_id` to the chat's message list. Returns `false` when
    /// the chat does not exist.
    async fn push_message(&self, chat_id: i64, message_id: i64) -> Result<bool, AppError>;
}
