//! Repository Implementations
//!
//! Implementations of the domain repository traits.
//!
//! - **PgUserRepository / PgChatRepository / PgMessageRepository** -
//!   PostgreSQL; array columns hold the document-style id lists
//! - **InMemoryStore** - one struct implementing all three traits
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::Repositories;
//!
//! fn setup_repositories(pool: PgPool) -> Repositories {
//!     Repositories::postgres(pool)
//! }
//! ```

pub mod chat_repository;
pub mod memory;
pub mod message_repository;
pub mod user_repository;

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::{ChatRepository, MessageRepository, UserRepository};

pub use chat_repository::PgChatRepository;
pub use memory::InMemoryStore;
pub use message_repository::PgMessageRepository;
pub use user_repository::PgUserRepository;

/// The set of repositories the application runs against.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub chats: Arc<dyn ChatRepository>,
    pub messages: Arc<dyn MessageRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            chats: Arc::new(PgChatRepository::new(pool.clone())),
            messages: Arc::new(PgMessageRepository::new(pool)),
        }
    }

    /// Repositories backed by one shared in-memory store.
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            chats: store.clone(),
            messages: store,
        }
    }
}
