use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::booking::Booking;
use crate::models::location::GeoLocation;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Default,
    Destructive,
}

/// User-facing toast.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarketEvent {
    Notification {
        #[serde(skip_serializing_if = "Option::is_none")]
        workflow_id: Option<Uuid>,
        notification: Notification,
    },
    ServiceSelected {
        workflow_id: Uuid,
        service_id: String,
        worker_id: String,
    },
    LocationSelected {
        location: GeoLocation,
    },
    BookingConfirmed {
        booking: Booking,
    },
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MarketEvent>,
}

impl EventBus {
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _unused_rx) = broadcast::channel(buffer_size.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.tx.subscribe()
    }

    /// Fire-and-forget; nobody listening is not an error.
    pub fn publish(&self, event: MarketEvent) {
        let _ = self.tx.send(event);
    }

    pub fn notify(&self, workflow_id: Option<Uuid>, notification: Notification) {
        self.publish(MarketEvent::Notification {
            workflow_id,
            notification,
        });
    }
}
