//! Database Module
//!
//! PostgreSQL pool setup for the `postgres` storage backend.

use std::time::Duration;

use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseSettings;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("failed to connect to PostgreSQL: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to apply migrations: {0}")]
    Migrate(#[from] MigrateError),
}

/// Open the pool and, when `run_migrations` is set, bring the users, chats
/// and messages tables up to date.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DatabaseError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout))
        .connect(&settings.url)
        .await
        .map_err(DatabaseError::Connect)?;
    tracing::info!(
        max_connections = settings.max_connections,
        "Database connection pool created"
    );

    if settings.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }
    Ok(pool)
}
