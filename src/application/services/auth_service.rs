//! Authentication Service
//!
//! Handles account registration, credential checks and JWT issuance.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;
use crate::domain::{User, UserRepository};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(&self, request: RegisterDto) -> Result<(User, AuthToken), AuthError>;

    /// Authenticate user with credentials
    async fn authenticate(&self, email: &str, password: &str) -> Result<(User, AuthToken), AuthError>;

    /// Validate access token and extract user ID
    async fn validate_token(&self, access_token: &str) -> Result<i64, AuthError>;
}

/// New account data
#[derive(Debug, Clone)]
pub struct RegisterDto {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub avatar_url: Option<String>,
}

/// Issued access token
#[derive(Debug, Clone, Serialize)]
pub struct AuthToken {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Email already exists")]
    EmailExists,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Issue a signed access token for `user_id`.
pub fn issue_token(settings: &JwtSettings, user_id: i64) -> Result<AuthToken, AuthError> {
    let now = Utc::now();
    let expiry = now + Duration::minutes(settings.access_token_expiry_minutes);
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiry.timestamp(),
        iat: now.timestamp(),
    };

    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

    Ok(AuthToken {
        access_token,
        expires_in: settings.access_token_expiry_minutes * 60,
        token_type: "Bearer".to_string(),
    })
}

/// Verify an access token and return the user id it was issued for.
pub fn verify_token(secret: &str, token: &str) -> Result<i64, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    token_data
        .claims
        .sub
        .parse::<i64>()
        .map_err(|_| AuthError::InvalidToken)
}

/// AuthService implementation
pub struct AuthServiceImpl<U>
where
    U: UserRepository + ?Sized,
{
    user_repo: Arc<U>,
    id_generator: Arc<SnowflakeGenerator>,
    jwt_settings: JwtSettings,
}

impl<U> AuthServiceImpl<U>
where
    U: UserRepository + ?Sized,
{
    /// Create a new AuthServiceImpl
    pub fn new(user_repo: Arc<U>, id_generator: Arc<SnowflakeGenerator>, jwt_settings: JwtSettings) -> Self {
        Self {
            user_repo,
            id_generator,
            jwt_settings,
        }
    }

    /// Hash a password using Argon2id
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against its hash
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[async_trait]
impl<U> AuthService for AuthServiceImpl<U>
where
    U: UserRepository + ?Sized + 'static,
{
    async fn register(&self, request: RegisterDto) -> Result<(User, AuthToken), AuthError> {
        let email = request.email.trim().to_lowercase();

        if self
            .user_repo
            .find_by_email(&email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .is_some()
        {
            return Err(AuthError::EmailExists);
        }

        let user = User {
            id: self.id_generator.generate(),
            email,
            display_name: request.display_name.trim().to_string(),
            password_hash: self.hash_password(&request.password)?,
            avatar_url: request.avatar_url,
            created_at: Utc::now(),
            chats: Vec::new(),
        };

        // A concurrent registration may still win the unique index.
        let created = self.user_repo.create(&user).await.map_err(|e| match e {
            AppError::Conflict(_) => AuthError::EmailExists,
            e => AuthError::Internal(e.to_string()),
        })?;

        let token = issue_token(&self.jwt_settings, created.id)?;
        tracing::info!(user_id = created.id, "User registered");
        Ok((created, token))
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<(User, AuthToken), AuthError> {
        let user = self
            .user_repo
            .find_by_email(email.trim())
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = issue_token(&self.jwt_settings, user.id)?;
        Ok((user, token))
    }

    async fn validate_token(&self, access_token: &str) -> Result<i64, AuthError> {
        verify_token(&self.jwt_settings.secret, access_token)
    }
}
