//! Authentication Middleware
//!
//! JWT validation for protected routes. Tokens are read from the
//! `Authorization: Bearer` header or, failing that, from the `token` cookie.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Cookie, HeaderMapExt};

use crate::application::services::{verify_token, AuthError};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Name of the cookie that may carry the access token.
pub const TOKEN_COOKIE: &str = "token";

/// Authenticated user extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Extractor for routes where authentication is optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaybeAuthUser(pub Option<i64>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(
            parts.extensions.get::<AuthUser>().map(|auth| auth.user_id),
        ))
    }
}

/// Find the raw token in the request headers.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        return value.strip_prefix("Bearer ").map(str::to_string);
    }

    // Browsers cannot set headers on a WebSocket upgrade; the cookie may
    // hold either the bare token or "Bearer <token>".
    let cookie = headers.typed_get::<Cookie>()?;
    let value = cookie.get(TOKEN_COOKIE)?;
    let value = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Bearer%20"))
        .unwrap_or(value);
    (!value.is_empty()).then(|| value.to_string())
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("Missing access token".into()))?;

    let user_id = verify_token(&state.settings.jwt.secret, &token).map_err(|e| match e {
        AuthError::TokenExpired => AppError::Unauthorized("Token expired".into()),
        _ => AppError::Unauthorized("Invalid token".into()),
    })?;

    request.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(request).await)
}

/// Optional authentication middleware (doesn't fail if no token)
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(request.headers()) {
        match verify_token(&state.settings.jwt.secret, &token) {
            Ok(user_id) => {
                request.extensions_mut().insert(AuthUser { user_id });
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring invalid token"),
        }
    }

    next.run(request).await
}
