//! Authentication Handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::application::dto::request::{LoginRequest, RegisterRequest};
use crate::application::dto::response::AuthResponse;
use crate::application::services::{AuthError, AuthService, AuthServiceImpl, RegisterDto};
use crate::domain::UserRepository;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn auth_service(state: &AppState) -> AuthServiceImpl<dyn UserRepository> {
    AuthServiceImpl::new(
        state.repos.users.clone(),
        state.snowflake.clone(),
        state.settings.jwt.clone(),
    )
}

fn map_auth_error(e: AuthError) -> AppError {
    match e {
        AuthError::InvalidCredentials => AppError::Unauthorized("Invalid email or password".into()),
        AuthError::EmailExists => AppError::Conflict("Email already exists".into()),
        AuthError::TokenExpired | AuthError::InvalidToken => AppError::Unauthorized(e.to_string()),
        AuthError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let (user, token) = auth_service(&state)
        .register(RegisterDto {
            email: body.email,
            display_name: body.display_name,
            password: body.password,
            avatar_url: body.avatar_url,
        })
        .await
        .map_err(map_auth_error)?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(user, token))))
}

/// Login with credentials
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let (user, token) = auth_service(&state)
        .authenticate(&body.email, &body.password)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(AuthResponse::new(user, token)))
}
