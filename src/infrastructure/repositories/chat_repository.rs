//! Chat Repository Implementation
//!
//! PostgreSQL implementation of the ChatRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Chat, ChatRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ChatRow {
    id: i64,
    name: Option<String>,
    is_group: bool,
    participant_ids: Vec<i64>,
    message_ids: Vec<i64>,
    created_at: DateTime<Utc>,
}

impl From<ChatRow> for Chat {
    fn from(row: ChatRow) -> Self {
        Chat {
            id: row.id,
            name: row.name,
            is_group: row.is_group,
            participants: row.participant_ids,
            messages: row.message_ids,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL chat repository
#[derive(Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn insert(&self, chat: &Chat) -> Result<Chat, AppError> {
        let row = sqlx::query_as::<_, ChatRow>(
            r#"
            INSERT INTO chats (id, name, is_group, participant_ids, message_ids, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, is_group, participant_ids, message_ids, created_at
            "#,
        )
        .bind(chat.id)
        .bind(&chat.name)
        .bind(chat.is_group)
        .bind(&chat.participants)
        .bind(&chat.messages)
        .bind(chat.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Chat>, AppError> {
        let row = sqlx::query_as::<_, ChatRow>(
            r#"
            SELECT id, name, is_group, participant_ids, message_ids, created_at
            FROM chats
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Chat::from))
    }

    async fn find_by_participants(&self, participants: &[i64]) -> Result<Option<Chat>, AppError> {
        // Array containment both ways is set equality, since participant
        // arrays never hold duplicates.
        let row = sqlx::query_as::<_, ChatRow>(
            r#"
            SELECT id, name, is_group, participant_ids, message_ids, created_at
            FROM chats
            WHERE participant_ids @> $1 AND participant_ids <@ $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(participants)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Chat::from))
    }

    async fn push_message(&self, chat_id: i64, message_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE chats
            SET message_ids = array_append(message_ids, $2)
            WHERE id = $1
            "#,
        )
        .bind(chat_id)
        .bind(message_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
