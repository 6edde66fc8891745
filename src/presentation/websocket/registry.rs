//! Connection Registry
//!
//! The set of live sessions, keyed by an opaque [`SessionHandle`].
//!
//! All state sits behind one `RwLock`. Writers (register/unregister) take it
//! exclusively for the map mutation only; [`ConnectionRegistry::snapshot`]
//! copies the entries out under the shared lock so that callers iterate and
//! do I/O without holding it.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::mpsc;

use super::frame::Frame;
use crate::infrastructure::metrics;

/// Opaque identifier of one live connection.
///
/// Allocated from a process-wide counter and never reused, so a stale handle
/// can never name a newer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionHandle(u64);

impl SessionHandle {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Why a frame could not be queued for a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("recipient outbound queue is full")]
    Backpressure,

    #[error("recipient connection is closed")]
    Closed,
}

impl DeliveryError {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryError::Backpressure => "backpressure",
            DeliveryError::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("registry is shutting down")]
    ShuttingDown,

    #[error("connection limit of {0} reached")]
    CapacityReached(usize),
}

/// A registered session as seen by the dispatcher.
#[derive(Debug)]
pub struct SessionEntry {
    pub handle: SessionHandle,
    /// Authenticated user behind the connection, if any.
    pub user_id: Option<i64>,
    pub registered_at: DateTime<Utc>,
    outbound: mpsc::Sender<Frame>,
}

impl SessionEntry {
    /// Queue a frame for this session's writer without waiting.
    pub fn try_deliver(&self, frame: Frame) -> Result<(), DeliveryError> {
        self.outbound.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<SessionHandle, Arc<SessionEntry>>,
    shutting_down: bool,
}

/// Registry of live sessions.
pub struct ConnectionRegistry {
    inner: RwLock<Inner>,
    next_handle: AtomicU64,
    max_connections: usize,
}

impl ConnectionRegistry {
    pub fn new(max_connections: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            next_handle: AtomicU64::new(1),
            max_connections,
        }
    }

    /// Add a session. It is visible to [`snapshot`](Self::snapshot) as soon as
    /// this returns.
    ///
    /// The registry keeps the only long-lived clone of `outbound`; removing
    /// the entry is what lets the session's writer drain and stop.
    pub fn register(
        &self,
        user_id: Option<i64>,
        outbound: mpsc::Sender<Frame>,
    ) -> Result<SessionHandle, RegistryError> {
        let (handle, live) = {
            let mut inner = self.inner.write();
            if inner.shutting_down {
                return Err(RegistryError::ShuttingDown);
            }
            if inner.sessions.len() >= self.max_connections {
                return Err(RegistryError::CapacityReached(self.max_connections));
            }

            let handle = SessionHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
            let entry = Arc::new(SessionEntry {
                handle,
                user_id,
                registered_at: Utc::now(),
                outbound,
            });
            inner.sessions.insert(handle, entry);
            (handle, inner.sessions.len())
        };

        metrics::set_websocket_sessions(live);
        tracing::info!(session = %handle, user_id = ?user_id, live, "Session registered");
        Ok(handle)
    }

    /// Remove a session. Idempotent: returns `false` if it was already gone.
    pub fn unregister(&self, handle: SessionHandle) -> bool {
        let (removed, live) = {
            let mut inner = self.inner.write();
            let removed = inner.sessions.remove(&handle);
            (removed, inner.sessions.len())
        };

        match removed {
            Some(entry) => {
                metrics::set_websocket_sessions(live);
                tracing::info!(
                    session = %handle,
                    user_id = ?entry.user_id,
                    live,
                    "Session unregistered"
                );
                true
            }
            None => false,
        }
    }

    /// Point-in-time copy of every registered session.
    pub fn snapshot(&self) -> Vec<Arc<SessionEntry>> {
        let inner = self.inner.read();
        let mut entries: Vec<_> = inner.sessions.values().cloned().collect();
        drop(inner);
        entries.sort_by_key(|e| e.handle);
        entries
    }

    pub fn contains(&self, handle: SessionHandle) -> bool {
        self.inner.read().sessions.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.inner.read().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `user_id` has at least one live session.
    pub fn is_user_online(&self, user_id: i64) -> bool {
        self.inner
            .read()
            .sessions
            .values()
            .any(|e| e.user_id == Some(user_id))
    }

    /// Refuse new sessions and drop every registered one. Dropping the
    /// entries closes their outbound queues, so writers flush and exit.
    /// Returns how many sessions were dropped.
    pub fn shutdown(&self) -> usize {
        let drained = {
            let mut inner = self.inner.write();
            inner.shutting_down = true;
            std::mem::take(&mut inner.sessions)
        };
        metrics::set_websocket_sessions(0);
        tracing::info!(dropped = drained.len(), "Connection registry shut down");
        drained.len()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.read().shutting_down
    }
}
