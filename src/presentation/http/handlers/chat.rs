//! Chat Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::parse_id;
use crate::application::dto::request::CreateChatRequest;
use crate::application::dto::response::{ChatResponse, ReconcileResponse};
use crate::application::services::{MembershipCoordinator, MembershipError, MembershipService};
use crate::domain::{Chat, ChatRepository, UserRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

pub(crate) fn coordinator(
    state: &AppState,
) -> MembershipCoordinator<dyn UserRepository, dyn ChatRepository> {
    MembershipCoordinator::new(
        state.repos.users.clone(),
        state.repos.chats.clone(),
        state.snowflake.clone(),
    )
}

pub(crate) fn map_membership_error(e: MembershipError) -> AppError {
    match e {
        MembershipError::DuplicateParticipant(_) | MembershipError::TooFewParticipants => {
            AppError::BadRequest(e.to_string())
        }
        MembershipError::UserNotFound(_) => AppError::NotFound(e.to_string()),
        MembershipError::ChatNotFound(_) => AppError::NotFound("Chat not found".into()),
        // The details are already logged; clients get a generic failure and
        // may retry after reconciling.
        MembershipError::PartialMembership { .. } => {
            AppError::Internal("Chat membership was only partially applied".into())
        }
        MembershipError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Load a chat the caller participates in.
pub(crate) async fn load_chat_for(
    state: &AppState,
    chat_id: i64,
    user_id: i64,
) -> Result<Chat, AppError> {
    let chat = state
        .repos
        .chats
        .find_by_id(chat_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chat not found".into()))?;

    if !chat.has_participant(user_id) {
        return Err(AppError::Forbidden("Not a participant of this chat".into()));
    }
    Ok(chat)
}

/// Create a chat. The caller is always a participant and is placed first
/// when missing from the list.
pub async fn create_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateChatRequest>,
) -> Result<(StatusCode, Json<ChatResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let mut participants = body
        .participants
        .iter()
        .map(|raw| parse_id(raw, "participant"))
        .collect::<Result<Vec<_>, _>>()?;
    if !participants.contains(&auth.user_id) {
        participants.insert(0, auth.user_id);
    }

    let chat = coordinator(&state)
        .create_chat(&participants, body.name)
        .await
        .map_err(map_membership_error)?;

    Ok((StatusCode::CREATED, Json(ChatResponse::from(chat))))
}

/// Get a chat the caller participates in
pub async fn get_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatResponse>, AppError> {
    let chat_id = parse_id(&chat_id, "chat")?;
    let chat = load_chat_for(&state, chat_id, auth.user_id).await?;
    Ok(Json(ChatResponse::from(chat)))
}

/// Repair missing user → chat back-references
pub async fn reconcile_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
) -> Result<Json<ReconcileResponse>, AppError> {
    let chat_id = parse_id(&chat_id, "chat")?;
    load_chat_for(&state, chat_id, auth.user_id).await?;

    let repaired = coordinator(&state)
        .reconcile_chat(chat_id)
        .await
        .map_err(map_membership_error)?;

    Ok(Json(ReconcileResponse {
        chat_id: chat_id.to_string(),
        repaired: repaired.iter().map(i64::to_string).collect(),
    }))
}
