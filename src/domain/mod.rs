//! # Domain Layer
//!
//! Entities of the chat backend and the repository traits through which
//! they are persisted. Independent of any framework or storage engine.
//!
//! The repository traits only offer single-document operations. Keeping
//! User and Chat consistent across documents is the job of the
//! application-layer membership coordinator.

pub mod entities;

pub use entities::*;
