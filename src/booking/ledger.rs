use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::booking::{Booking, BookingRequest, BookingStatus, PaymentStatus};
use crate::models::chat::{ChatMessage, MessageKind};

/// Sender id used for messages the system posts into a booking thread.
pub const SYSTEM_SENDER: &str = "system";

/// Bookings and their chat threads.
#[derive(Default)]
pub struct BookingLedger {
    bookings: DashMap<String, Booking>,
    messages: DashMap<String, Vec<ChatMessage>>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    /// Stores a booking for a request whose payment already went through
    /// and opens its thread with a system message.
    pub fn record(&self, request: BookingRequest) -> Booking {
        let now = Utc::now();
        let notes = Some(request.notes).filter(|notes| !notes.trim().is_empty());

        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            customer_id: request.customer_id.unwrap_or_else(|| "guest".to_string()),
            worker_id: request.worker_id,
            service_id: request.service_id,
            status: BookingStatus::Confirmed,
            scheduled_at: request.scheduled_at,
            total_amount: request.total_amount,
            payment_status: PaymentStatus::Paid,
            created_at: now,
            notes,
        };

        self.bookings.insert(booking.id.clone(), booking.clone());
        self.messages.insert(
            booking.id.clone(),
            vec![ChatMessage {
                id: Uuid::new_v4().to_string(),
                booking_id: booking.id.clone(),
                sender_id: SYSTEM_SENDER.to_string(),
                message: format!(
                    "Booking confirmed for {}",
                    booking.scheduled_at.format("%Y-%m-%d %H:%M")
                ),
                timestamp: now,
                kind: MessageKind::System,
            }],
        );

        booking
    }

    pub fn get(&self, id: &str) -> Option<Booking> {
        self.bookings.get(id).map(|entry| entry.value().clone())
    }

    /// All bookings, earliest appointment first.
    pub fn list(&self) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        bookings.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at));
        bookings
    }

    pub fn for_worker(&self, worker_id: &str) -> Vec<Booking> {
        self.list()
            .into_iter()
            .filter(|booking| booking.worker_id == worker_id)
            .collect()
    }

    pub fn post_message(
        &self,
        booking_id: &str,
        sender_id: &str,
        message: &str,
    ) -> Result<ChatMessage, AppError> {
        if message.trim().is_empty() {
            return Err(AppError::BadRequest("message cannot be empty".to_string()));
        }
        if !self.bookings.contains_key(booking_id) {
            return Err(AppError::NotFound(format!("booking {} not found", booking_id)));
        }

        let chat = ChatMessage {
            id: Uuid::new_v4().to_string(),
            booking_id: booking_id.to_string(),
            sender_id: sender_id.to_string(),
            message: message.trim().to_string(),
            timestamp: Utc::now(),
            kind: MessageKind::Text,
        };

        self.messages
            .entry(booking_id.to_string())
            .or_default()
            .push(chat.clone());
        Ok(chat)
    }

    pub fn messages(&self, booking_id: &str) -> Result<Vec<ChatMessage>, AppError> {
        if !self.bookings.contains_key(booking_id) {
            return Err(AppError::NotFound(format!("booking {} not found", booking_id)));
        }
        Ok(self
            .messages
            .get(booking_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
