// libs/appointment-cell/src/services/events.rs
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::models::AppointmentStatus;

/// Outbound event emitted after a committed booking or transition. Consumed
/// asynchronously by the notifier; delivery itself is out of scope here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentEvent {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub status: AppointmentStatus,
    pub previous_status: Option<AppointmentStatus>,
}

/// Fire-and-forget event channel. Emission never blocks the transition's
/// commit; a closed channel is logged and ignored.
#[derive(Clone)]
pub struct AppointmentEvents {
    tx: mpsc::UnboundedSender<AppointmentEvent>,
}

impl AppointmentEvents {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AppointmentEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: AppointmentEvent) {
        if self.tx.send(event).is_err() {
            warn!("Notification channel closed; appointment event dropped");
        }
    }
}
