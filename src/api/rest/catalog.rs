use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::catalog::filter::{CatalogFilter, ALL_CATEGORIES};
use crate::catalog::seed::{map_locations, MapLocation, CATEGORIES};
use crate::dashboard::{build_dashboard, WorkerDashboard};
use crate::error::AppError;
use crate::events::MarketEvent;
use crate::geo::sort_by_distance;
use crate::models::location::{GeoLocation, GeoPoint};
use crate::models::service::{Service, ServicePatch};
use crate::models::user::Role;
use crate::models::worker::Worker;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/services", get(list_services).post(create_service))
        .route("/services/:id", get(get_service).patch(update_service))
        .route("/categories", get(list_categories))
        .route("/workers", get(list_workers))
        .route("/workers/:id", get(get_worker))
        .route("/workers/:id/dashboard", get(worker_dashboard))
        .route("/locations", get(list_locations))
        .route("/locations/select", post(select_location))
}

#[derive(Deserialize)]
pub struct ServiceQuery {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
    pub near_lat: Option<f64>,
    pub near_lng: Option<f64>,
}

#[derive(Deserialize)]
pub struct NearQuery {
    pub near_lat: Option<f64>,
    pub near_lng: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub worker_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub duration: u32,
    #[serde(default)]
    pub images: Vec<String>,
    pub location: GeoLocation,
}

fn origin(lat: Option<f64>, lng: Option<f64>) -> Option<GeoPoint> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
        _ => None,
    }
}

async fn require_provider(state: &AppState) -> Result<(), AppError> {
    let user = state.session.require().await?;
    match user.role {
        Role::Worker | Role::Admin => Ok(()),
        Role::User => Err(AppError::Forbidden(
            "only workers and admins can manage services".to_string(),
        )),
    }
}

async fn list_services(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ServiceQuery>,
) -> Result<Json<Vec<Service>>, AppError> {
    let filter = CatalogFilter::new(
        params.q,
        params
            .category
            .filter(|category| !category.is_empty())
            .unwrap_or_else(|| ALL_CATEGORIES.to_string()),
    );
    let mut services = state.catalog.query_services(&filter).await?;
    state.metrics.catalog_queries_total.inc();

    if let Some(origin) = origin(params.near_lat, params.near_lng) {
        sort_by_distance(&mut services, &origin, |service| &service.location);
    }

    Ok(Json(services))
}

async fn create_service(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<Json<Service>, AppError> {
    require_provider(&state).await?;

    let service = Service {
        id: Uuid::new_v4().to_string(),
        worker_id: payload.worker_id,
        title: payload.title,
        description: payload.description,
        category: payload.category,
        price: payload.price,
        duration: payload.duration,
        images: payload.images,
        location: payload.location,
        created_at: Utc::now(),
    };

    let service = state.catalog.create_service(service).await?;
    info!(service_id = %service.id, worker_id = %service.worker_id, "service listed");
    Ok(Json(service))
}

async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Service>, AppError> {
    let service = state
        .catalog
        .get_service(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service {} not found", id)))?;

    Ok(Json(service))
}

async fn update_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<ServicePatch>,
) -> Result<Json<Service>, AppError> {
    require_provider(&state).await?;
    Ok(Json(state.catalog.update_service(&id, patch).await?))
}

async fn list_categories() -> Json<Vec<&'static str>> {
    Json(CATEGORIES.to_vec())
}

async fn list_workers(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Worker>>, AppError> {
    Ok(Json(state.catalog.list_workers().await?))
}

async fn get_worker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Worker>, AppError> {
    let worker = state
        .catalog
        .get_worker(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("worker {} not found", id)))?;

    Ok(Json(worker))
}

async fn worker_dashboard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WorkerDashboard>, AppError> {
    let worker = state
        .catalog
        .get_worker(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("worker {} not found", id)))?;

    let bookings = state.ledger.for_worker(&id);
    Ok(Json(build_dashboard(&worker, &bookings, Utc::now())))
}

async fn list_locations(Query(params): Query<NearQuery>) -> Json<Vec<MapLocation>> {
    let mut locations = map_locations();
    if let Some(origin) = origin(params.near_lat, params.near_lng) {
        sort_by_distance(&mut locations, &origin, |entry| &entry.location);
    }
    Json(locations)
}

async fn select_location(
    State(state): State<Arc<AppState>>,
    Json(location): Json<GeoLocation>,
) -> Result<Json<GeoLocation>, AppError> {
    if !(-90.0..=90.0).contains(&location.lat) || !(-180.0..=180.0).contains(&location.lng) {
        return Err(AppError::BadRequest("coordinates out of range".to_string()));
    }

    info!(address = %location.address, "location selected");
    state.events.publish(MarketEvent::LocationSelected {
        location: location.clone(),
    });
    Ok(Json(location))
}
