use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::models::booking::{Booking, BookingStatus, PaymentStatus};
use crate::models::worker::{Availability, Worker};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Earnings {
    pub today: f64,
    pub this_week: f64,
    pub this_month: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDashboard {
    pub worker_id: String,
    pub name: String,
    pub rating: f64,
    pub total_jobs: u32,
    pub availability: Availability,
    pub active_bookings: Vec<Booking>,
    pub earnings: Earnings,
}

/// Builds the dashboard for `worker` from their bookings as of `now`.
///
/// Earnings count paid, non-cancelled bookings by appointment time; "this
/// week" is the ISO week containing `now`.
pub fn build_dashboard(worker: &Worker, bookings: &[Booking], now: DateTime<Utc>) -> WorkerDashboard {
    let own = bookings
        .iter()
        .filter(|booking| booking.worker_id == worker.id());

    let mut active_bookings: Vec<Booking> = own
        .clone()
        .filter(|booking| booking.status.is_active())
        .cloned()
        .collect();
    active_bookings.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at));

    let mut earnings = Earnings::default();
    let today = now.date_naive();
    for booking in own.filter(|b| {
        b.payment_status == PaymentStatus::Paid && b.status != BookingStatus::Cancelled
    }) {
        let day = booking.scheduled_at.date_naive();
        if day == today {
            earnings.today += booking.total_amount;
        }
        if day.iso_week() == today.iso_week() {
            earnings.this_week += booking.total_amount;
        }
        if day.year() == today.year() && day.month() == today.month() {
            earnings.this_month += booking.total_amount;
        }
    }

    WorkerDashboard {
        worker_id: worker.id().to_string(),
        name: worker.name().to_string(),
        rating: worker.rating,
        total_jobs: worker.total_jobs,
        availability: worker.availability,
        active_bookings,
        earnings,
    }
}
