//! Membership Service
//!
//! Creates chats and keeps both sides of the user ↔ chat relation
//! consistent: `chat.participants` and every participant's `user.chats`.
//!
//! Storage offers only single-document atomic updates, so chat creation is
//! a sequence of independently fallible steps. Each completed step is
//! logged. A failure after the chat document exists is reported as
//! [`MembershipError::PartialMembership`] with the users linked so far;
//! nothing is rolled back. [`MembershipService::reconcile_chat`] heals such
//! a chat by re-linking every participant.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Chat, ChatRepository, UserRepository};
use crate::infrastructure::metrics;
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::first_duplicate;

/// Smallest participant set a chat may have.
pub const MIN_PARTICIPANTS: usize = 2;

/// Membership service trait
#[async_trait]
pub trait MembershipService: Send + Sync {
    /// Create a chat between `participants` and link it from every
    /// participant's chat list.
    async fn create_chat(
        &self,
        participants: &[i64],
        name: Option<String>,
    ) -> Result<Chat, MembershipError>;

    /// Append a message id to a chat's message sequence.
    async fn append_message(&self, chat_id: i64, message_id: i64) -> Result<(), MembershipError>;

    /// Re-link every participant of `chat_id` that lacks the back-reference.
    /// Returns the repaired user ids.
    async fn reconcile_chat(&self, chat_id: i64) -> Result<Vec<i64>, MembershipError>;
}

/// Membership service errors
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    #[error("Participant {0} is listed more than once")]
    DuplicateParticipant(i64),

    #[error("A chat needs at least {MIN_PARTICIPANTS} participants")]
    TooFewParticipants,

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Chat not found: {0}")]
    ChatNotFound(i64),

    #[error("Chat {chat_id} was created but linking user {failed_user} failed: {reason}")]
    PartialMembership {
        chat_id: i64,
        /// Users whose chat list already contains `chat_id`.
        linked: Vec<i64>,
        failed_user: i64,
        reason: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MembershipError {
    fn outcome(&self) -> &'static str {
        match self {
            MembershipError::DuplicateParticipant(_)
            | MembershipError::TooFewParticipants
            | MembershipError::UserNotFound(_)
            | MembershipError::ChatNotFound(_) => "rejected",
            MembershipError::PartialMembership { .. } => "partial",
            MembershipError::Internal(_) => "error",
        }
    }
}

fn record<T>(operation: &str, result: &Result<T, MembershipError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.outcome(),
    };
    metrics::record_membership(operation, outcome);
}

/// MembershipService implementation
pub struct MembershipCoordinator<U, C>
where
    U: UserRepository + ?Sized,
    C: ChatRepository + ?Sized,
{
    user_repo: Arc<U>,
    chat_repo: Arc<C>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<U, C> MembershipCoordinator<U, C>
where
    U: UserRepository + ?Sized,
    C: ChatRepository + ?Sized,
{
    pub fn new(user_repo: Arc<U>, chat_repo: Arc<C>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self {
            user_repo,
            chat_repo,
            id_generator,
        }
    }

    /// Add `chat_id` to one user's chat list.
    async fn link(&self, user_id: i64, chat_id: i64) -> Result<(), String> {
        match self.user_repo.add_chat(user_id, chat_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(format!("user {user_id} not found")),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn try_create_chat(
        &self,
        participants: &[i64],
        name: Option<String>,
    ) -> Result<Chat, MembershipError> {
        if let Some(duplicate) = first_duplicate(participants) {
            return Err(MembershipError::DuplicateParticipant(duplicate));
        }
        if participants.len() < MIN_PARTICIPANTS {
            return Err(MembershipError::TooFewParticipants);
        }

        let is_group = participants.len() > MIN_PARTICIPANTS;
        if !is_group {
            let existing = self
                .chat_repo
                .find_by_participants(participants)
                .await
                .map_err(|e| MembershipError::Internal(e.to_string()))?;
            if let Some(chat) = existing {
                tracing::debug!(chat_id = chat.id, "Reusing existing one-on-one chat");
                self.try_reconcile(chat.id).await?;
                return Ok(chat);
            }
        }

        // Every participant must exist before the chat document is written.
        // One-on-one chats are named after the second participant.
        let mut second_name = None;
        for (position, &user_id) in participants.iter().enumerate() {
            let user = self
                .user_repo
                .find_by_id(user_id)
                .await
                .map_err(|e| MembershipError::Internal(e.to_string()))?
                .ok_or(MembershipError::UserNotFound(user_id))?;
            if position == 1 {
                second_name = Some(user.display_name);
            }
        }
        let name = if is_group { name } else { second_name };

        let chat = Chat::new(self.id_generator.generate(), name, participants.to_vec());
        let chat = self
            .chat_repo
            .insert(&chat)
            .await
            .map_err(|e| MembershipError::Internal(e.to_string()))?;
        tracing::debug!(chat_id = chat.id, step = "chat_inserted", "Membership step completed");

        let mut linked = Vec::with_capacity(participants.len());
        for &user_id in participants {
            if let Err(reason) = self.link(user_id, chat.id).await {
                tracing::warn!(
                    chat_id = chat.id,
                    user_id,
                    linked = ?linked,
                    reason = %reason,
                    "Chat membership partially applied"
                );
                return Err(MembershipError::PartialMembership {
                    chat_id: chat.id,
                    linked,
                    failed_user: user_id,
                    reason,
                });
            }
            tracing::debug!(chat_id = chat.id, user_id, step = "user_linked", "Membership step completed");
            linked.push(user_id);
        }

        tracing::info!(
            chat_id = chat.id,
            participants = chat.participants.len(),
            is_group = chat.is_group,
            "Chat created"
        );
        Ok(chat)
    }

    async fn try_reconcile(&self, chat_id: i64) -> Result<Vec<i64>, MembershipError> {
        let chat = self
            .chat_repo
            .find_by_id(chat_id)
            .await
            .map_err(|e| MembershipError::Internal(e.to_string()))?
            .ok_or(MembershipError::ChatNotFound(chat_id))?;

        let mut repaired = Vec::new();
        for &user_id in &chat.participants {
            let user = self
                .user_repo
                .find_by_id(user_id)
                .await
                .map_err(|e| MembershipError::Internal(e.to_string()))?
                .ok_or(MembershipError::UserNotFound(user_id))?;
            if user.is_in_chat(chat_id) {
                continue;
            }

            let added = self
                .user_repo
                .add_chat(user_id, chat_id)
                .await
                .map_err(|e| MembershipError::Internal(e.to_string()))?;
            if !added {
                return Err(MembershipError::UserNotFound(user_id));
            }
            repaired.push(user_id);
        }

        if !repaired.is_empty() {
            tracing::info!(chat_id, repaired = ?repaired, "Chat membership reconciled");
        }
        Ok(repaired)
    }
}

#[async_trait]
impl<U, C> MembershipService for MembershipCoordinator<U, C>
where
    U: UserRepository + ?Sized + 'static,
    C: ChatRepository + ?Sized + 'static,
{
    async fn create_chat(
        &self,
        participants: &[i64],
        name: Option<String>,
    ) -> Result<Chat, MembershipError> {
        let result = self.try_create_chat(participants, name).await;
        record("create_chat", &result);
        result
    }

    async fn append_message(&self, chat_id: i64, message_id: i64) -> Result<(), MembershipError> {
        let result = match self.chat_repo.push_message(chat_id, message_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MembershipError::ChatNotFound(chat_id)),
            Err(e) => Err(MembershipError::Internal(e.to_string())),
        };
        record("append_message", &result);
        result
    }

    async fn reconcile_chat(&self, chat_id: i64) -> Result<Vec<i64>, MembershipError> {
        let result = self.try_reconcile(chat_id).await;
        record("reconcile_chat", &result);
        result
    }
}
