//! # Domain Entities
//!
//! Core domain entities of the chat backend.
//!
//! - **User**: account with profile data and the set of chats it belongs to
//! - **Chat**: a one-on-one or group conversation and its message ids
//! - **Message**: a persisted message inside a chat
//!
//! Each entity has an associated repository trait defining data access
//! operations. These traits are implemented in the infrastructure layer.

mod chat;
mod message;
mod user;

pub use chat::{Chat, ChatRepository};
pub use message::{Message, MessageRepository, MAX_MESSAGE_LENGTH};
pub use user::{User, UserRepository};

#[cfg(test)]
pub use chat::MockChatRepository;
#[cfg(test)]
pub use message::MockMessageRepository;
#[cfg(test)]
pub use user::MockUserRepository;
