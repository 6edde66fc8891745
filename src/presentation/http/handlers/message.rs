//! Message Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use super::chat::coordinator;
use super::parse_id;
use crate::application::dto::request::SendMessageRequest;
use crate::application::dto::response::MessageResponse;
use crate::application::services::{
    CreateMessageDto, MessageError, MessageQueryDto, MessageService, MessageServiceImpl,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Message query parameters
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub before: Option<String>,
    pub limit: Option<i64>,
}

fn message_service(state: &AppState) -> impl MessageService {
    MessageServiceImpl::new(
        state.repos.messages.clone(),
        state.repos.chats.clone(),
        Arc::new(coordinator(state)),
        state.snowflake.clone(),
    )
}

fn map_message_error(e: MessageError) -> AppError {
    match e {
        MessageError::ChatNotFound => AppError::NotFound("Chat not found".into()),
        MessageError::Forbidden => AppError::Forbidden(e.to_string()),
        MessageError::InvalidRecipient | MessageError::EmptyBody | MessageError::ContentTooLong => {
            AppError::BadRequest(e.to_string())
        }
        MessageError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Get chat history, oldest first
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let chat_id = parse_id(&chat_id, "chat")?;
    let before = query
        .before
        .as_deref()
        .map(|raw| parse_id(raw, "message"))
        .transpose()?;

    let messages = message_service(&state)
        .get_messages(
            chat_id,
            auth.user_id,
            MessageQueryDto {
                before,
                limit: query.limit,
            },
        )
        .await
        .map_err(map_message_error)?;

    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

/// Persist a message in a chat
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    body.validate().map_err(validation_error)?;
    let chat_id = parse_id(&chat_id, "chat")?;
    let recipient_id = body
        .recipient_id
        .as_deref()
        .map(|raw| parse_id(raw, "recipient"))
        .transpose()?;

    let message = message_service(&state)
        .send_message(
            chat_id,
            auth.user_id,
            CreateMessageDto {
                body: body.body,
                recipient_id,
            },
        )
        .await
        .map_err(map_message_error)?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}
