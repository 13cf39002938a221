use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::booking::BookingRequest;
use crate::models::service::Service;
use crate::models::worker::Worker;

/// Bookable start times, hourly through the working day.
pub const TIME_SLOTS: [&str; 9] = [
    "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00",
];

pub fn parse_time_slot(slot: &str) -> Result<NaiveTime, AppError> {
    if !TIME_SLOTS.contains(&slot) {
        return Err(AppError::Validation(format!(
            "{slot} is not an available time slot"
        )));
    }

    NaiveTime::parse_from_str(slot, "%H:%M")
        .map_err(|err| AppError::Validation(format!("invalid time slot {slot}: {err}")))
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowPhase {
    Collecting,
    Submitting,
    Confirmed,
    Dismissed,
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowPhase::Collecting => "collecting",
            WorkflowPhase::Submitting => "submitting",
            WorkflowPhase::Confirmed => "confirmed",
            WorkflowPhase::Dismissed => "dismissed",
        };
        f.write_str(label)
    }
}

/// One customer's attempt to book one service.
///
/// Validation and submission happen in [`BookingWorkflow::begin_submission`];
/// the async part of the flow lives in the booking desk, which reports the
/// result back through [`complete`](Self::complete) or [`fail`](Self::fail).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWorkflow {
    pub id: Uuid,
    pub service: Service,
    pub worker_id: String,
    pub worker_name: String,
    pub customer_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub notes: String,
    pub phase: WorkflowPhase,
    pub busy: bool,
    pub last_error: Option<String>,
    pub opened_at: DateTime<Utc>,
}

impl BookingWorkflow {
    pub fn open(
        service: Service,
        worker: &Worker,
        customer_id: Option<String>,
    ) -> Result<Self, AppError> {
        if service.worker_id != worker.id() {
            return Err(AppError::BadRequest(format!(
                "service {} is not offered by worker {}",
                service.id,
                worker.id()
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            service,
            worker_id: worker.id().to_string(),
            worker_name: worker.name().to_string(),
            customer_id,
            date: None,
            time: None,
            notes: String::new(),
            phase: WorkflowPhase::Collecting,
            busy: false,
            last_error: None,
            opened_at: Utc::now(),
        })
    }

    fn ensure_collecting(&self) -> Result<(), AppError> {
        if self.phase != WorkflowPhase::Collecting {
            return Err(AppError::Conflict(format!(
                "workflow {} is {}",
                self.id, self.phase
            )));
        }
        Ok(())
    }

    /// Dates before `today` cannot be booked.
    pub fn select_date(&mut self, date: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
        self.ensure_collecting()?;
        if date < today {
            return Err(AppError::Validation(format!("{date} is in the past")));
        }
        self.date = Some(date);
        Ok(())
    }

    pub fn select_time(&mut self, slot: &str) -> Result<(), AppError> {
        self.ensure_collecting()?;
        self.time = Some(parse_time_slot(slot)?);
        Ok(())
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<(), AppError> {
        self.ensure_collecting()?;
        self.notes = notes.into();
        Ok(())
    }

    /// Validates the selection and moves to `Submitting`.
    ///
    /// On a validation error nothing changes and the workflow stays in
    /// `Collecting`. A workflow already submitting is rejected as a conflict.
    pub fn begin_submission(&mut self) -> Result<BookingRequest, AppError> {
        if self.busy {
            return Err(AppError::Conflict(format!(
                "booking {} is already being submitted",
                self.id
            )));
        }
        self.ensure_collecting()?;

        let (date, time) = match (self.date, self.time) {
            (Some(date), Some(time)) => (date, time),
            (None, Some(_)) => {
                return Err(AppError::Validation("please select a date".to_string()));
            }
            (Some(_), None) => {
                return Err(AppError::Validation("please select a time".to_string()));
            }
            (None, None) => {
                return Err(AppError::Validation(
                    "please select both date and time".to_string(),
                ));
            }
        };

        let request = BookingRequest {
            service_id: self.service.id.clone(),
            worker_id: self.worker_id.clone(),
            customer_id: self.customer_id.clone(),
            scheduled_at: date.and_time(time).and_utc(),
            notes: self.notes.clone(),
            total_amount: self.service.price,
        };

        self.busy = true;
        self.phase = WorkflowPhase::Submitting;
        self.last_error = None;
        Ok(request)
    }

    pub fn complete(&mut self) {
        self.busy = false;
        self.phase = WorkflowPhase::Confirmed;
    }

    /// Back to `Collecting` with the selection intact so the user can retry.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.busy = false;
        self.phase = WorkflowPhase::Collecting;
        self.last_error = Some(reason.into());
    }

    pub fn dismiss(&mut self) {
        self.busy = false;
        self.phase = WorkflowPhase::Dismissed;
    }
}
