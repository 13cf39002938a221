use std::sync::Arc;
use std::time::Duration;

use crate::booking::desk::BookingDesk;
use crate::booking::handler::LedgerHandler;
use crate::booking::ledger::BookingLedger;
use crate::booking::processor::{BookingProcessor, SimulatedProcessor};
use crate::catalog::repository::{CatalogRepository, InMemoryCatalog};
use crate::error::AppError;
use crate::events::EventBus;
use crate::observability::metrics::Metrics;
use crate::session::context::SessionContext;
use crate::session::identity::MockIdentityProvider;
use crate::session::storage::MemoryStorage;

pub struct AppState {
    pub session: SessionContext,
    pub catalog: Arc<dyn CatalogRepository>,
    pub ledger: Arc<BookingLedger>,
    pub desk: BookingDesk,
    pub events: EventBus,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        session: SessionContext,
        catalog: Arc<dyn CatalogRepository>,
        processor: Arc<dyn BookingProcessor>,
        event_buffer_size: usize,
    ) -> Self {
        let events = EventBus::new(event_buffer_size);
        let metrics = Metrics::new();
        let ledger = Arc::new(BookingLedger::new());
        let handler = Arc::new(LedgerHandler::new(ledger.clone(), events.clone()));
        let desk = BookingDesk::new(processor, handler, events.clone(), metrics.clone());

        Self {
            session,
            catalog,
            ledger,
            desk,
            events,
            metrics,
        }
    }

    /// Everything in memory: empty catalog, no persisted session, simulated
    /// payments taking `booking_delay`.
    pub fn in_memory(booking_delay: Duration, event_buffer_size: usize) -> Result<Self, AppError> {
        let session = SessionContext::initialize(
            Arc::new(MemoryStorage::new()),
            Arc::new(MockIdentityProvider::new()),
        )?;

        Ok(Self::new(
            session,
            Arc::new(InMemoryCatalog::new()),
            Arc::new(SimulatedProcessor::new(booking_delay)),
            event_buffer_size,
        ))
    }
}
