//! WebSocket Connection Handler
//!
//! Adapts an upgraded axum socket to the gateway's session loop.

use std::future;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use super::frame::{Frame, Inbound};
use super::gateway::Gateway;
use crate::presentation::middleware::MaybeAuthUser;
use crate::startup::AppState;

/// WebSocket upgrade handler. Authentication is optional; anonymous
/// sessions relay frames like any other.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    MaybeAuthUser(user_id): MaybeAuthUser,
) -> Response {
    let settings = &state.settings.websocket;
    let gateway = state.gateway.clone();

    ws.max_message_size(settings.max_message_size)
        .max_frame_size(settings.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, gateway, user_id))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, gateway: Arc<Gateway>, user_id: Option<i64>) {
    let (sink, stream) = socket.split();

    let inbound = stream.map(|message| message.map(Inbound::from));
    let outbound =
        sink.with(|frame: Frame| future::ready(Ok::<_, axum::Error>(Message::from(frame))));

    let reason = gateway.serve(user_id, inbound, outbound).await;
    tracing::debug!(user_id = ?user_id, reason = ?reason, "WebSocket connection finished");
}
