//! User Handlers

use axum::{
    extract::{Extension, Path, State},
    Json,
};

use super::parse_id;
use crate::application::dto::response::UserResponse;
use crate::application::services::{UserError, UserService, UserServiceImpl};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn map_user_error(e: UserError) -> AppError {
    match e {
        UserError::NotFound => AppError::NotFound("User not found".into()),
        UserError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Get the caller's own profile, including email and chat list
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserServiceImpl::new(state.repos.users.clone())
        .get_user(auth.user_id)
        .await
        .map_err(map_user_error)?;

    Ok(Json(UserResponse::from_user(user, true)))
}

/// Get another user's public profile
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user_id = parse_id(&user_id, "user")?;

    let user = UserServiceImpl::new(state.repos.users.clone())
        .get_user(user_id)
        .await
        .map_err(map_user_error)?;

    let is_self = user.id == auth.user_id;
    Ok(Json(UserResponse::from_user(user, is_self)))
}
