//! User Repository Implementation
//!
//! PostgreSQL implementation of the UserRepository trait.
//! Maps between the database schema and domain User entity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{User, UserRepository};
use crate::shared::error::AppError;

/// Database row representation matching the users table schema.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    display_name: String,
    password_hash: String,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    chat_ids: Vec<i64>,
}

impl UserRow {
    /// Convert database row to domain User entity.
    fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            password_hash: self.password_hash,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
            chats: self.chat_ids,
        }
    }
}

/// PostgreSQL user repository implementation.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, password_hash, avatar_url, created_at, chat_ids
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, password_hash, avatar_url, created_at, chat_ids
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, display_name, password_hash, avatar_url, created_at, chat_ids)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, email, display_name, password_hash, avatar_url, created_at, chat_ids
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(&user.avatar_url)
        .bind(user.created_at)
        .bind(&user.chats)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Email already registered".into())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_user())
    }

    async fn add_chat(&self, user_id: i64, chat_id: i64) -> Result<bool, AppError> {
        // Single-row update: the array append and the membership test run
        // atomically on the one document.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET chat_ids = CASE
                WHEN $2 = ANY(chat_ids) THEN chat_ids
                ELSE array_append(chat_ids, $2)
            END
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(chat_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
