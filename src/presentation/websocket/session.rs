//! Session Reader Loop
//!
//! One task per connection: Open → read frame → dispatch → Open, until the
//! peer closes, the stream ends or errors, the peer stays silent past the
//! read timeout, or the writer gives up. The session is then unregistered
//! exactly once and the outbound sink is flushed and closed.

use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::timeout;

use super::dispatcher::BroadcastDispatcher;
use super::frame::{Frame, Inbound};
use super::registry::{ConnectionRegistry, RegistryError, SessionHandle};
use crate::config::WebSocketSettings;

/// Per-connection resource bounds.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub outbound_buffer: usize,
}

impl From<&WebSocketSettings> for SessionLimits {
    fn from(settings: &WebSocketSettings) -> Self {
        Self {
            read_timeout: settings.read_timeout(),
            write_timeout: settings.write_timeout(),
            outbound_buffer: settings.outbound_buffer.max(1),
        }
    }
}

/// Why a session reached Closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The registry refused the session; nothing was registered.
    Rejected(RegistryError),
    /// The peer sent a close frame.
    PeerClosed,
    /// The inbound stream ended.
    EndOfStream,
    /// Reading from the stream failed.
    ReadError(String),
    /// Nothing arrived within the read timeout.
    IdleTimeout,
    /// The writer stopped (write error or write timeout).
    WriterStopped,
}

/// Bookkeeping for one open session.
#[derive(Debug)]
pub struct SessionState {
    pub handle: SessionHandle,
    pub user_id: Option<i64>,
    pub frames_received: u64,
    pub opened_at: Instant,
}

impl SessionState {
    fn new(handle: SessionHandle, user_id: Option<i64>) -> Self {
        Self {
            handle,
            user_id,
            frames_received: 0,
            opened_at: Instant::now(),
        }
    }
}

/// Unregisters on drop, so every exit path (including unwinding) removes
/// the session exactly once.
struct Registration {
    registry: Arc<ConnectionRegistry>,
    handle: SessionHandle,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.unregister(self.handle);
    }
}

/// Drive one session to completion.
///
/// `inbound` yields decoded messages from the peer; `outbound` accepts the
/// frames other sessions dispatch to this one. Both are released before
/// this returns.
pub async fn run_session<S, E, K>(
    dispatcher: &BroadcastDispatcher,
    limits: SessionLimits,
    user_id: Option<i64>,
    mut inbound: S,
    mut outbound: K,
) -> CloseReason
where
    S: Stream<Item = Result<Inbound, E>> + Unpin,
    E: Display,
    K: Sink<Frame> + Unpin + Send + 'static,
    K::Error: Display + Send,
{
    let registry = dispatcher.registry().clone();
    let (tx, rx) = mpsc::channel(limits.outbound_buffer);

    let handle = match registry.register(user_id, tx) {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!(user_id = ?user_id, error = %e, "Session rejected");
            let _ = timeout(limits.write_timeout, outbound.close()).await;
            return CloseReason::Rejected(e);
        }
    };
    let registration = Registration {
        registry,
        handle,
    };
    let mut state = SessionState::new(handle, user_id);

    let mut writer = tokio::spawn(write_loop(outbound, rx, limits.write_timeout, handle));
    let mut writer_done = false;

    let reason = loop {
        tokio::select! {
            next = timeout(limits.read_timeout, inbound.next()) => match next {
                Err(_) => break CloseReason::IdleTimeout,
                Ok(None) => break CloseReason::EndOfStream,
                Ok(Some(Err(e))) => break CloseReason::ReadError(e.to_string()),
                Ok(Some(Ok(Inbound::Close))) => break CloseReason::PeerClosed,
                Ok(Some(Ok(Inbound::Control))) => {}
                Ok(Some(Ok(Inbound::Frame(frame)))) => {
                    state.frames_received += 1;
                    dispatcher.dispatch(handle, frame);
                }
            },
            _ = &mut writer => {
                writer_done = true;
                break CloseReason::WriterStopped;
            }
        }
    };

    // Dropping the registration drops the registry's sender; the writer then
    // flushes whatever is queued and closes the sink.
    drop(registration);
    if !writer_done && timeout(limits.write_timeout, &mut writer).await.is_err() {
        writer.abort();
    }

    tracing::debug!(
        session = %state.handle,
        user_id = ?state.user_id,
        frames = state.frames_received,
        open_for = ?state.opened_at.elapsed(),
        reason = ?reason,
        "Session closed"
    );
    reason
}

/// Forward queued frames to the sink, bounding every write.
async fn write_loop<K>(
    mut sink: K,
    mut rx: mpsc::Receiver<Frame>,
    write_timeout: Duration,
    handle: SessionHandle,
) where
    K: Sink<Frame> + Unpin,
    K::Error: Display,
{
    while let Some(frame) = rx.recv().await {
        match timeout(write_timeout, sink.send(frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(session = %handle, error = %e, "Write failed");
                return;
            }
            Err(_) => {
                tracing::debug!(session = %handle, "Write timed out");
                return;
            }
        }
    }
    let _ = timeout(write_timeout, sink.close()).await;
}
