//! WebSocket Gateway
//!
//! Owns the connection registry and dispatcher shared by every session.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Sink, Stream};

use super::dispatcher::BroadcastDispatcher;
use super::frame::{Frame, Inbound};
use super::registry::ConnectionRegistry;
use super::session::{run_session, CloseReason, SessionLimits};
use crate::config::WebSocketSettings;

/// Real-time hub: every frame a session sends is relayed to all others.
pub struct Gateway {
    dispatcher: BroadcastDispatcher,
    limits: SessionLimits,
}

impl Gateway {
    pub fn new(settings: &WebSocketSettings) -> Self {
        let registry = Arc::new(ConnectionRegistry::new(settings.max_connections));
        Self {
            dispatcher: BroadcastDispatcher::new(registry),
            limits: SessionLimits::from(settings),
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        self.dispatcher.registry()
    }

    pub fn dispatcher(&self) -> &BroadcastDispatcher {
        &self.dispatcher
    }

    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    /// Run one connection until it closes.
    pub async fn serve<S, E, K>(&self, user_id: Option<i64>, inbound: S, outbound: K) -> CloseReason
    where
        S: Stream<Item = Result<Inbound, E>> + Unpin,
        E: Display,
        K: Sink<Frame> + Unpin + Send + 'static,
        K::Error: Display + Send,
    {
        run_session(&self.dispatcher, self.limits, user_id, inbound, outbound).await
    }

    pub fn session_count(&self) -> usize {
        self.registry().len()
    }

    pub fn is_user_online(&self, user_id: i64) -> bool {
        self.registry().is_user_online(user_id)
    }

    /// Stop accepting sessions and close the live ones.
    pub fn shutdown(&self) -> usize {
        self.registry().shutdown()
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new(&WebSocketSettings::default())
    }
}
