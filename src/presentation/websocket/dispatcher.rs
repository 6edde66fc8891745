//! Broadcast Dispatcher
//!
//! Delivers one frame to every registered session except its origin.

use std::sync::Arc;

use super::frame::Frame;
use super::registry::{ConnectionRegistry, DeliveryError, SessionHandle};
use crate::infrastructure::metrics;

/// Result of handing a frame to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub recipient: SessionHandle,
    pub result: Result<(), DeliveryError>,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fans frames out over a [`ConnectionRegistry`].
///
/// Deliveries only enqueue into each recipient's bounded outbound queue, so a
/// slow or dead peer costs one failed `try_send` and never stalls the batch.
#[derive(Clone)]
pub struct BroadcastDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl BroadcastDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Deliver `frame` to every session but `origin`.
    ///
    /// Returns one outcome per recipient in handle order. Failures are
    /// logged and counted; they never abort delivery to the others.
    pub fn dispatch(&self, origin: SessionHandle, frame: Frame) -> Vec<DeliveryOutcome> {
        let recipients = self.registry.snapshot();
        let mut outcomes = Vec::with_capacity(recipients.len().saturating_sub(1));

        for entry in recipients.iter().filter(|e| e.handle != origin) {
            let result = entry.try_deliver(frame.clone());
            match &result {
                Ok(()) => metrics::record_delivery("delivered"),
                Err(e) => {
                    metrics::record_delivery(e.as_str());
                    tracing::warn!(
                        origin = %origin,
                        recipient = %entry.handle,
                        error = %e,
                        "Delivery failed"
                    );
                }
            }
            outcomes.push(DeliveryOutcome {
                recipient: entry.handle,
                result,
            });
        }

        tracing::trace!(
            origin = %origin,
            recipients = outcomes.len(),
            bytes = frame.len(),
            "Frame dispatched"
        );
        outcomes
    }
}
