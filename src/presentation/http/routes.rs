//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::logging::track_metrics;
use crate::presentation::middleware::{auth_middleware, optional_auth_middleware};
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // WebSocket gateway; a token is optional
        .merge(gateway_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

fn gateway_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/gateway", get(ws_handler))
        .route_layer(middleware::from_fn_with_state(state, optional_auth_middleware))
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes(state.clone()))
        .nest("/chats", chat_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
}

/// User routes (protected)
fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/@me", get(handlers::user::get_current_user))
        .route("/{user_id}", get(handlers::user::get_user))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Chat routes (protected)
fn chat_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::chat::create_chat))
        .route("/{chat_id}", get(handlers::chat::get_chat))
        .route("/{chat_id}/reconcile", post(handlers::chat::reconcile_chat))
        .route(
            "/{chat_id}/messages",
            get(handlers::message::get_messages).post(handlers::message::send_message),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
