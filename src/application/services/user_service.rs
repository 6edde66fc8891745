//! User Service
//!
//! Read access to user profiles.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{User, UserRepository};

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, user_id: i64) -> Result<User, UserError>;
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// UserService implementation
pub struct UserServiceImpl<U>
where
    U: UserRepository + ?Sized,
{
    user_repo: Arc<U>,
}

impl<U> UserServiceImpl<U>
where
    U: UserRepository + ?Sized,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl<U> UserService for UserServiceImpl<U>
where
    U: UserRepository + ?Sized + 'static,
{
    async fn get_user(&self, user_id: i64) -> Result<User, UserError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
            .ok_or(UserError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockUserRepository;

    #[tokio::test]
    async fn test_missing_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let result = UserServiceImpl::new(Arc::new(repo)).get_user(1).await;
        assert!(matches!(result, Err(UserError::NotFound)));
    }

    #[tokio::test]
    async fn test_existing_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|id| {
            Ok(Some(User {
                id,
                display_name: "Dana".into(),
                ..User::default()
            }))
        });

        let user = UserServiceImpl::new(Arc::new(repo)).get_user(9).await.unwrap();
        assert_eq!(user.display_name, "Dana");
    }
}
