//! Notification-boundary event sink
//!
//! Breach and near-breach events leave the engine here. Delivery transport
//! (email, push) belongs to the notification collaborator; this adapter
//! emits structured tracing events that the host application subscribes to.

use async_trait::async_trait;
use deskline_core::SlaEventSink;
use deskline_domain::{BreachEvent, Result, UpcomingBreachEvent};
use tracing::{info, warn};

/// Sink that surfaces engine events as structured log records.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

#[async_trait]
impl SlaEventSink for LoggingEventSink {
    async fn breach_detected(&self, event: BreachEvent) -> Result<()> {
        warn!(
            ticket_id = %event.ticket_id,
            kind = %event.kind,
            due_at = %event.due_at,
            detected_at = %event.detected_at,
            "sla_breach_detected"
        );
        Ok(())
    }

    async fn breach_approaching(&self, event: UpcomingBreachEvent) -> Result<()> {
        info!(
            ticket_id = %event.ticket_id,
            kind = %event.kind,
            due_at = %event.due_at,
            "sla_breach_approaching"
        );
        Ok(())
    }
}
