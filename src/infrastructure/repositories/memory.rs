//! In-Memory Repository Implementation
//!
//! Process-local store implementing every repository trait. Used when
//! `storage.backend = "memory"` and as the backing store for tests.
//! Each collection sits behind its own lock, so like the PostgreSQL
//! backend it offers no atomicity across documents.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{Chat, ChatRepository, Message, MessageRepository, User, UserRepository};
use crate::shared::error::AppError;

/// In-memory user, chat and message collections.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<i64, User>>,
    chats: RwLock<HashMap<i64, Chat>>,
    messages: RwLock<HashMap<i64, Message>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored chats.
    pub fn chat_count(&self) -> usize {
        self.chats.read().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.write();
        if users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(AppError::Conflict("Email already registered".into()));
        }
        if users.contains_key(&user.id) {
            return Err(AppError::Conflict(format!("User {} already exists", user.id)));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn add_chat(&self, user_id: i64, chat_id: i64) -> Result<bool, AppError> {
        let mut users = self.users.write();
        match users.get_mut(&user_id) {
            Some(user) => {
                if !user.chats.contains(&chat_id) {
                    user.chats.push(chat_id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl ChatRepository for InMemoryStore {
    async fn insert(&self, chat: &Chat) -> Result<Chat, AppError> {
        let mut chats = self.chats.write();
        if chats.contains_key(&chat.id) {
            return Err(AppError::Conflict(format!("Chat {} already exists", chat.id)));
        }
        chats.insert(chat.id, chat.clone());
        Ok(chat.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Chat>, AppError> {
        Ok(self.chats.read().get(&id).cloned())
    }

    async fn find_by_participants(&self, participants: &[i64]) -> Result<Option<Chat>, AppError> {
        Ok(self
            .chats
            .read()
            .values()
            .filter(|c| c.same_participants(participants))
            .min_by_key(|c| c.id)
            .cloned())
    }

    async fn push_message(&self, chat_id: i64, message_id: i64) -> Result<bool, AppError> {
        let mut chats = self.chats.write();
        match chats.get_mut(&chat_id) {
            Some(chat) => {
                chat.messages.push(message_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn insert(&self, message: &Message) -> Result<Message, AppError> {
        let mut messages = self.messages.write();
        if messages.contains_key(&message.id) {
            return Err(AppError::Conflict(format!("Message {} already exists", message.id)));
        }
        messages.insert(message.id, message.clone());
        Ok(message.clone())
    }

    async fn find_by_chat(
        &self,
        chat_id: i64,
        before: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Message>, AppError> {
        let mut found: Vec<Message> = self
            .messages
            .read()
            .values()
            .filter(|m| m.chat_id == chat_id && before.map_or(true, |b| m.id < b))
            .cloned()
            .collect();

        // Newest `limit` messages, returned oldest first.
        found.sort_by_key(|m| std::cmp::Reverse(m.id));
        found.truncate(limit.max(0) as usize);
        found.reverse();
        Ok(found)
    }
}
