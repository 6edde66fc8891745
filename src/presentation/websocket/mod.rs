//! WebSocket Gateway
//!
//! Real-time relay hub: a registry of live sessions, a dispatcher that fans
//! each inbound frame out to every other session, and the per-connection
//! session loop.

pub mod dispatcher;
pub mod frame;
pub mod gateway;
pub mod handler;
pub mod registry;
pub mod session;

pub use dispatcher::{BroadcastDispatcher, DeliveryOutcome};
pub use frame::{Frame, Inbound};
pub use gateway::Gateway;
pub use handler::ws_handler;
pub use registry::{ConnectionRegistry, DeliveryError, RegistryError, SessionEntry, SessionHandle};
pub use session::{run_session, CloseReason, SessionLimits, SessionState};
