use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::user::{Role, User};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(current_session).delete(logout))
        .route("/session/login", post(login))
        .route("/session/register", post(register))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

async fn current_session(State(state): State<Arc<AppState>>) -> Result<Json<User>, AppError> {
    Ok(Json(state.session.require().await?))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<User>, AppError> {
    let user = state.session.login(&payload.email, &payload.password).await?;
    state
        .metrics
        .session_events_total
        .with_label_values(&["login"])
        .inc();
    Ok(Json(user))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<User>, AppError> {
    let user = state
        .session
        .register(&payload.email, &payload.password, &payload.name, payload.role)
        .await?;
    state
        .metrics
        .session_events_total
        .with_label_values(&["register"])
        .inc();
    Ok(Json(user))
}

async fn logout(State(state): State<Arc<AppState>>) -> Result<StatusCode, AppError> {
    state.session.logout().await?;
    state
        .metrics
        .session_events_total
        .with_label_values(&["logout"])
        .inc();
    Ok(StatusCode::NO_CONTENT)
}
