use std::sync::Arc;

use tracing::info;

use crate::booking::ledger::BookingLedger;
use crate::events::{EventBus, MarketEvent};
use crate::models::booking::BookingRequest;

/// Receives the payload of every confirmed booking, once per booking.
pub trait BookingHandler: Send + Sync {
    fn on_confirmed(&self, request: BookingRequest);
}

impl<F> BookingHandler for F
where
    F: Fn(BookingRequest) + Send + Sync,
{
    fn on_confirmed(&self, request: BookingRequest) {
        self(request)
    }
}

/// Records confirmed bookings in the ledger and announces them.
pub struct LedgerHandler {
    ledger: Arc<BookingLedger>,
    events: EventBus,
}

impl LedgerHandler {
    pub fn new(ledger: Arc<BookingLedger>, events: EventBus) -> Self {
        Self { ledger, events }
    }
}

impl BookingHandler for LedgerHandler {
    fn on_confirmed(&self, request: BookingRequest) {
        let booking = self.ledger.record(request);
        info!(
            booking_id = %booking.id,
            worker_id = %booking.worker_id,
            scheduled_at = %booking.scheduled_at,
            "booking recorded"
        );
        self.events.publish(MarketEvent::BookingConfirmed { booking });
    }
}
