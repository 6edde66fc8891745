//! Middleware
//!
//! Tower middleware for request processing.

pub mod auth;
pub mod cors;
pub mod logging;

pub use auth::{auth_middleware, optional_auth_middleware, AuthUser, MaybeAuthUser};
