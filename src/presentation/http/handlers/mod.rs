//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod auth;
pub mod chat;
pub mod health;
pub mod message;
pub mod user;

use crate::shared::error::AppError;
use crate::shared::snowflake;

/// Parse a snowflake id taken from a path or body.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    snowflake::from_string(raw).map_err(|_| AppError::BadRequest(format!("Invalid {} ID", what)))
}
