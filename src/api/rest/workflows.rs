use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::booking::desk::WorkflowUpdate;
use crate::booking::workflow::BookingWorkflow;
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workflows", post(open_workflow))
        .route(
            "/workflows/:id",
            get(get_workflow).patch(update_workflow).delete(dismiss_workflow),
        )
        .route("/workflows/:id/confirm", post(confirm_workflow))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenWorkflowRequest {
    pub service_id: String,
}

async fn open_workflow(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OpenWorkflowRequest>,
) -> Result<Json<BookingWorkflow>, AppError> {
    let service = state
        .catalog
        .get_service(&payload.service_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service {} not found", payload.service_id)))?;

    let worker = state
        .catalog
        .get_worker(&service.worker_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("worker {} not found", service.worker_id)))?;

    let customer_id = state.session.current().await.map(|user| user.id);
    let workflow = state.desk.open(service, &worker, customer_id)?;
    Ok(Json(workflow))
}

async fn get_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingWorkflow>, AppError> {
    Ok(Json(state.desk.get(id)?))
}

async fn update_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(update): Json<WorkflowUpdate>,
) -> Result<Json<BookingWorkflow>, AppError> {
    Ok(Json(state.desk.update(id, update)?))
}

/// Validates synchronously, then runs the submission in the background.
/// Progress is reported over `/ws` and visible through `GET /workflows/:id`.
async fn confirm_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<BookingWorkflow>), AppError> {
    let submission = state.desk.submit(id)?;
    let workflow = submission.workflow().clone();

    let background = state.clone();
    tokio::spawn(async move {
        let outcome = background.desk.process(submission).await;
        debug!(workflow_id = %id, ?outcome, "submission finished");
    });

    Ok((StatusCode::ACCEPTED, Json(workflow)))
}

async fn dismiss_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingWorkflow>, AppError> {
    Ok(Json(state.desk.dismiss(id)?))
}
