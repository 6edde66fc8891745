//! # Chat Hub Library
//!
//! A two-person and group chat backend with:
//! - RESTful HTTP API for accounts, chats and message history
//! - WebSocket gateway that relays every frame to all other live sessions
//! - Chat-membership bookkeeping that keeps users and chats consistent
//!   without multi-document transactions
//! - PostgreSQL or in-memory storage
//!
//! ## Architecture
//!
//! - **Domain Layer**: Core entities and repository traits
//! - **Application Layer**: Services (auth, membership, messages) and DTOs
//! - **Infrastructure Layer**: Storage backends and metrics
//! - **Presentation Layer**: HTTP handlers, middleware and WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! chat_hub/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities and repository traits
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, repositories and metrics
//! +-- presentation/   HTTP routes, middleware, WebSocket gateway
//! +-- shared/         Common utilities (errors, snowflake IDs, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
