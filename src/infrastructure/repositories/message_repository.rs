//! Message Repository Implementation
//!
//! PostgreSQL implementation of the MessageRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Message, MessageRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    chat_id: i64,
    sender_id: i64,
    body: String,
    arrival_time: DateTime<Utc>,
    recipient_id: Option<i64>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            chat_id: row.chat_id,
            sender_id: row.sender_id,
            body: row.body,
            arrival_time: row.arrival_time,
            recipient_id: row.recipient_id,
        }
    }
}

/// PostgreSQL message repository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn insert(&self, message: &Message) -> Result<Message, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (id, chat_id, sender_id, body, arrival_time, recipient_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, chat_id, sender_id, body, arrival_time, recipient_id
            "#,
        )
        .bind(message.id)
        .bind(message.chat_id)
        .bind(message.sender_id)
        .bind(&message.body)
        .bind(message.arrival_time)
        .bind(message.recipient_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_chat(
        &self,
        chat_id: i64,
        before: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Message>, AppError> {
        let mut rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, chat_id, sender_id, body, arrival_time, recipient_id
            FROM messages
            WHERE chat_id = $1 AND ($2::BIGINT IS NULL OR id < $2)
            ORDER BY id DESC
            LIMIT $3
            "#,
        )
        .bind(chat_id)
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.reverse();
        Ok(rows.into_iter().map(Message::from).collect())
    }
}
