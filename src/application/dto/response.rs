//! Response DTOs
//!
//! Data structures for API response bodies. Snowflake ids are serialized as
//! strings so JavaScript clients do not lose precision.

use serde::Serialize;

use crate::application::services::AuthToken;
use crate::domain::{Chat, Message, User};

/// Authentication response (user and token)
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl AuthResponse {
    pub fn new(user: User, token: AuthToken) -> Self {
        Self {
            user: UserResponse::from_user(user, true),
            access_token: token.access_token,
            expires_in: token.expires_in,
            token_type: token.token_type,
        }
    }
}

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub display_name: String,
    pub avatar_url: Option<String>,
    /// Only present for the caller's own profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chats: Option<Vec<String>>,
    pub created_at: String,
}

impl UserResponse {
    /// `private` exposes the email and chat list; use it only for the caller.
    pub fn from_user(user: User, private: bool) -> Self {
        Self {
            id: user.id.to_string(),
            email: private.then_some(user.email),
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            chats: private.then(|| user.chats.iter().map(i64::to_string).collect()),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub id: String,
    pub name: Option<String>,
    pub is_group: bool,
    pub participants: Vec<String>,
    pub message_count: usize,
    pub created_at: String,
}

impl From<Chat> for ChatResponse {
    fn from(chat: Chat) -> Self {
        Self {
            id: chat.id.to_string(),
            name: chat.name,
            is_group: chat.is_group,
            participants: chat.participants.iter().map(i64::to_string).collect(),
            message_count: chat.messages.len(),
            created_at: chat.created_at.to_rfc3339(),
        }
    }
}

/// Message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub body: String,
    pub arrival_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_string(),
            chat_id: message.chat_id.to_string(),
            sender_id: message.sender_id.to_string(),
            body: message.body,
            arrival_time: message.arrival_time.to_rfc3339(),
            recipient_id: message.recipient_id.map(|id| id.to_string()),
        }
    }
}

/// Result of a reconciliation pass
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub chat_id: String,
    pub repaired: Vec<String>,
}
