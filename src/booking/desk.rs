use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::booking::handler::BookingHandler;
use crate::booking::processor::BookingProcessor;
use crate::booking::workflow::{BookingWorkflow, WorkflowPhase};
use crate::error::AppError;
use crate::events::{EventBus, MarketEvent, Notification};
use crate::models::booking::BookingRequest;
use crate::models::service::Service;
use crate::models::worker::Worker;
use crate::observability::metrics::Metrics;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowUpdate {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SubmissionOutcome {
    Confirmed { request: BookingRequest },
    Failed { reason: String },
    Cancelled,
}

/// A workflow that passed validation and is waiting on the processor.
#[derive(Debug)]
pub struct Submission {
    id: Uuid,
    request: BookingRequest,
    workflow: BookingWorkflow,
    cancel_rx: watch::Receiver<bool>,
}

impl Submission {
    /// The workflow as it was when it entered `Submitting`.
    pub fn workflow(&self) -> &BookingWorkflow {
        &self.workflow
    }
}

struct OpenWorkflow {
    workflow: BookingWorkflow,
    cancel: watch::Sender<bool>,
    touched: Instant,
}

/// Owns every open booking workflow and drives submissions.
///
/// Workflow entries are never locked across an `.await`; a submission
/// reacquires its entry once the processor returns. Dismissing a workflow
/// removes its entry and signals the in-flight submission to stop, so the
/// completion handler only ever runs for workflows that are still open.
pub struct BookingDesk {
    workflows: DashMap<Uuid, OpenWorkflow>,
    processor: Arc<dyn BookingProcessor>,
    handler: Arc<dyn BookingHandler>,
    events: EventBus,
    metrics: Metrics,
}

impl BookingDesk {
    pub fn new(
        processor: Arc<dyn BookingProcessor>,
        handler: Arc<dyn BookingHandler>,
        events: EventBus,
        metrics: Metrics,
    ) -> Self {
        Self {
            workflows: DashMap::new(),
            processor,
            handler,
            events,
            metrics,
        }
    }

    pub fn open_count(&self) -> usize {
        self.workflows.len()
    }

    pub fn open(
        &self,
        service: Service,
        worker: &Worker,
        customer_id: Option<String>,
    ) -> Result<BookingWorkflow, AppError> {
        let workflow = BookingWorkflow::open(service, worker, customer_id)?;
        let (cancel, _unused_rx) = watch::channel(false);

        self.workflows.insert(
            workflow.id,
            OpenWorkflow {
                workflow: workflow.clone(),
                cancel,
                touched: Instant::now(),
            },
        );
        self.metrics.workflows_open.inc();

        self.events.publish(MarketEvent::ServiceSelected {
            workflow_id: workflow.id,
            service_id: workflow.service.id.clone(),
            worker_id: workflow.worker_id.clone(),
        });
        info!(
            workflow_id = %workflow.id,
            service_id = %workflow.service.id,
            "booking workflow opened"
        );

        Ok(workflow)
    }

    pub fn get(&self, id: Uuid) -> Result<BookingWorkflow, AppError> {
        self.workflows
            .get(&id)
            .map(|entry| entry.workflow.clone())
            .ok_or_else(|| AppError::NotFound(format!("workflow {} not found", id)))
    }

    /// Applies every field present in `update`, or none of them if any
    /// field is rejected.
    pub fn update(&self, id: Uuid, update: WorkflowUpdate) -> Result<BookingWorkflow, AppError> {
        let mut entry = self
            .workflows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("workflow {} not found", id)))?;

        let mut staged = entry.workflow.clone();
        if let Some(date) = update.date {
            staged.select_date(date, Utc::now().date_naive())?;
        }
        if let Some(time) = update.time {
            staged.select_time(&time)?;
        }
        if let Some(notes) = update.notes {
            staged.set_notes(notes)?;
        }

        entry.workflow = staged.clone();
        entry.touched = Instant::now();
        Ok(staged)
    }

    /// Validates the workflow and moves it to `Submitting`.
    ///
    /// Validation failures and duplicate submissions come back as errors with
    /// the workflow untouched; a missing selection also raises a
    /// notification. The returned [`Submission`] must be handed to
    /// [`process`](Self::process).
    pub fn submit(&self, id: Uuid) -> Result<Submission, AppError> {
        let started = {
            let mut entry = self
                .workflows
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("workflow {} not found", id)))?;
            let request = entry.workflow.begin_submission();
            entry.touched = Instant::now();
            request.map(|request| (request, entry.workflow.clone(), entry.cancel.subscribe()))
        };

        match started {
            Ok((request, workflow, cancel_rx)) => Ok(Submission {
                id,
                request,
                workflow,
                cancel_rx,
            }),
            Err(err @ AppError::Validation(_)) => {
                self.events.notify(
                    Some(id),
                    Notification::destructive("Missing information", err.to_string()),
                );
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Runs the remote part of a submission and applies its result.
    pub async fn process(&self, submission: Submission) -> SubmissionOutcome {
        let Submission {
            id,
            request,
            mut cancel_rx,
            ..
        } = submission;

        let start = Instant::now();
        let processed = tokio::select! {
            result = self.processor.process(&request) => Some(result),
            _ = cancelled(&mut cancel_rx) => None,
        };
        let elapsed = start.elapsed().as_secs_f64();

        match processed {
            None => {
                self.metrics.record_booking("cancelled", elapsed);
                info!(workflow_id = %id, "booking submission cancelled");
                SubmissionOutcome::Cancelled
            }
            Some(Ok(())) => self.finish(id, request, elapsed),
            Some(Err(err)) => {
                let reason = err.to_string();
                match self.workflows.get_mut(&id) {
                    Some(mut entry) => {
                        entry.workflow.fail(reason.clone());
                        entry.touched = Instant::now();
                    }
                    None => {
                        self.metrics.record_booking("cancelled", elapsed);
                        return SubmissionOutcome::Cancelled;
                    }
                }

                self.metrics.record_booking("error", elapsed);
                warn!(workflow_id = %id, error = %err, "booking submission failed");
                self.events.notify(
                    Some(id),
                    Notification::destructive("Booking failed", "Please try again."),
                );
                SubmissionOutcome::Failed { reason }
            }
        }
    }

    /// [`submit`](Self::submit) followed by [`process`](Self::process).
    pub async fn confirm(&self, id: Uuid) -> Result<SubmissionOutcome, AppError> {
        let submission = self.submit(id)?;
        Ok(self.process(submission).await)
    }

    fn finish(&self, id: Uuid, request: BookingRequest, elapsed: f64) -> SubmissionOutcome {
        // removal is the single hand-off point: whoever removes the entry
        // decides between confirmation and dismissal
        let removed = self
            .workflows
            .remove_if(&id, |_, open| open.workflow.phase == WorkflowPhase::Submitting);

        let Some((_, mut open)) = removed else {
            self.metrics.record_booking("cancelled", elapsed);
            info!(workflow_id = %id, "workflow closed before confirmation");
            return SubmissionOutcome::Cancelled;
        };

        open.workflow.complete();
        self.metrics.workflows_open.dec();
        self.handler.on_confirmed(request.clone());

        self.metrics.record_booking("success", elapsed);
        info!(
            workflow_id = %id,
            service_id = %request.service_id,
            amount = request.total_amount,
            "booking confirmed"
        );
        self.events.notify(
            Some(id),
            Notification::info(
                "Booking confirmed!",
                "Your booking has been successfully created.",
            ),
        );

        SubmissionOutcome::Confirmed { request }
    }

    /// Closes the workflow. An in-flight submission is cancelled and its
    /// completion handler will not run.
    pub fn dismiss(&self, id: Uuid) -> Result<BookingWorkflow, AppError> {
        let (_, open) = self
            .workflows
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("workflow {} not found", id)))?;

        let was_submitting = open.workflow.busy;
        open.cancel.send_replace(true);
        self.metrics.workflows_open.dec();

        let mut workflow = open.workflow;
        workflow.dismiss();
        info!(workflow_id = %id, was_submitting, "booking workflow dismissed");

        Ok(workflow)
    }

    /// Drops workflows left in `Collecting` for longer than `max_idle`.
    /// Submissions in flight are never expired.
    pub fn expire_idle(&self, max_idle: Duration) -> usize {
        let mut expired = 0usize;
        self.workflows.retain(|id, open| {
            let keep = open.workflow.phase != WorkflowPhase::Collecting
                || open.touched.elapsed() <= max_idle;
            if !keep {
                expired += 1;
                debug!(workflow_id = %id, "idle booking workflow expired");
            }
            keep
        });

        if expired > 0 {
            self.metrics.workflows_open.sub(expired as i64);
            info!(expired, "expired idle booking workflows");
        }
        expired
    }
}

/// Expires abandoned workflows every half `max_idle` (at least every 500ms).
pub async fn run_idle_sweeper(state: Arc<AppState>, max_idle: Duration) {
    let mut ticker = interval(max_idle.max(Duration::from_secs(1)) / 2);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        state.desk.expire_idle(max_idle);
    }
}

/// Resolves once the workflow is dismissed (flag set or sender gone).
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|cancelled| *cancelled).await;
}
