//! Message Service
//!
//! Persists chat messages and appends them to their chat's message sequence.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::membership_service::{MembershipError, MembershipService};
use crate::domain::{ChatRepository, Message, MessageRepository, MAX_MESSAGE_LENGTH};
use crate::shared::snowflake::SnowflakeGenerator;

/// Default and maximum page size for history queries.
pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Message service trait
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Store a message from `sender_id` in `chat_id`.
    async fn send_message(
        &self,
        chat_id: i64,
        sender_id: i64,
        request: CreateMessageDto,
    ) -> Result<Message, MessageError>;

    /// Chat history visible to `requester_id`, oldest first.
    async fn get_messages(
        &self,
        chat_id: i64,
        requester_id: i64,
        query: MessageQueryDto,
    ) -> Result<Vec<Message>, MessageError>;
}

/// Create message request
#[derive(Debug, Clone)]
pub struct CreateMessageDto {
    pub body: String,
    pub recipient_id: Option<i64>,
}

/// Message query parameters
#[derive(Debug, Clone, Default)]
pub struct MessageQueryDto {
    pub before: Option<i64>,
    pub limit: Option<i64>,
}

/// Message service errors
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Chat not found")]
    ChatNotFound,

    #[error("Sender is not a participant of this chat")]
    Forbidden,

    #[error("Recipient is not a participant of this chat")]
    InvalidRecipient,

    #[error("Message body is empty")]
    EmptyBody,

    #[error("Message too long")]
    ContentTooLong,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// MessageService implementation
pub struct MessageServiceImpl<M, C, S>
where
    M: MessageRepository + ?Sized,
    C: ChatRepository + ?Sized,
    S: MembershipService + ?Sized,
{
    message_repo: Arc<M>,
    chat_repo: Arc<C>,
    membership: Arc<S>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<M, C, S> MessageServiceImpl<M, C, S>
where
    M: MessageRepository + ?Sized,
    C: ChatRepository + ?Sized,
    S: MembershipService + ?Sized,
{
    pub fn new(
        message_repo: Arc<M>,
        chat_repo: Arc<C>,
        membership: Arc<S>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            message_repo,
            chat_repo,
            membership,
            id_generator,
        }
    }

    async fn check_participant(&self, chat_id: i64, user_id: i64) -> Result<Vec<i64>, MessageError> {
        let chat = self
            .chat_repo
            .find_by_id(chat_id)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?
            .ok_or(MessageError::ChatNotFound)?;

        if !chat.has_participant(user_id) {
            return Err(MessageError::Forbidden);
        }
        Ok(chat.participants)
    }
}

#[async_trait]
impl<M, C, S> MessageService for MessageServiceImpl<M, C, S>
where
    M: MessageRepository + ?Sized + 'static,
    C: ChatRepository + ?Sized + 'static,
    S: MembershipService + ?Sized + 'static,
{
    async fn send_message(
        &self,
        chat_id: i64,
        sender_id: i64,
        request: CreateMessageDto,
    ) -> Result<Message, MessageError> {
        // Arrival time is the moment of receipt, not of persistence.
        let arrival_time = Utc::now();

        if request.body.trim().is_empty() {
            return Err(MessageError::EmptyBody);
        }
        if request.body.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(MessageError::ContentTooLong);
        }

        let participants = self.check_participant(chat_id, sender_id).await?;
        if let Some(recipient) = request.recipient_id {
            if !participants.contains(&recipient) {
                return Err(MessageError::InvalidRecipient);
            }
        }

        let message = Message {
            id: self.id_generator.generate(),
            chat_id,
            sender_id,
            body: request.body,
            arrival_time,
            recipient_id: request.recipient_id,
        };
        let message = self
            .message_repo
            .insert(&message)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?;

        self.membership
            .append_message(chat_id, message.id)
            .await
            .map_err(|e| match e {
                MembershipError::ChatNotFound(_) => MessageError::ChatNotFound,
                e => MessageError::Internal(e.to_string()),
            })?;

        tracing::debug!(chat_id, message_id = message.id, sender_id, "Message stored");
        Ok(message)
    }

    async fn get_messages(
        &self,
        chat_id: i64,
        requester_id: i64,
        query: MessageQueryDto,
    ) -> Result<Vec<Message>, MessageError> {
        self.check_participant(chat_id, requester_id).await?;

        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        self.message_repo
            .find_by_chat(chat_id, query.before, limit)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))
    }
}
