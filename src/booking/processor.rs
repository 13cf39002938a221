use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

use crate::models::booking::BookingRequest;

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("processor unavailable: {0}")]
    Unavailable(String),
}

/// Remote side of a booking submission (payment capture, reservation).
#[async_trait]
pub trait BookingProcessor: Send + Sync {
    async fn process(&self, request: &BookingRequest) -> Result<(), ProcessorError>;
}

/// Accepts every request after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedProcessor {
    delay: Duration,
}

impl SimulatedProcessor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl BookingProcessor for SimulatedProcessor {
    async fn process(&self, request: &BookingRequest) -> Result<(), ProcessorError> {
        debug!(
            service_id = %request.service_id,
            amount = request.total_amount,
            delay_ms = self.delay.as_millis() as u64,
            "simulating payment"
        );
        sleep(self.delay).await;
        Ok(())
    }
}
