//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, credential checks, JWT tokens
//! - **UserService**: User profile lookup
//! - **MembershipService**: Chat creation and user ↔ chat consistency
//! - **MessageService**: Message persistence and history

pub mod auth_service;
pub mod membership_service;
pub mod message_service;
pub mod user_service;

// Re-export auth service types
pub use auth_service::{
    issue_token, verify_token, AuthError, AuthService, AuthServiceImpl, AuthToken, Claims,
    RegisterDto,
};

// Re-export membership service types
pub use membership_service::{
    MembershipCoordinator, MembershipError, MembershipService, MIN_PARTICIPANTS,
};

// Re-export message service types
pub use message_service::{
    CreateMessageDto, MessageError, MessageQueryDto, MessageService, MessageServiceImpl,
};

// Re-export user service types
pub use user_service::{UserError, UserService, UserServiceImpl};
