use std::sync::Arc;

use service_marketplace::api;
use service_marketplace::booking::desk::run_idle_sweeper;
use service_marketplace::booking::processor::SimulatedProcessor;
use service_marketplace::catalog::repository::{CatalogRepository, InMemoryCatalog};
use service_marketplace::catalog::seed::seed_catalog;
use service_marketplace::config::Config;
use service_marketplace::error::AppError;
use service_marketplace::session::{FileStorage, MockIdentityProvider, SessionContext};
use service_marketplace::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let session = SessionContext::initialize(
        Arc::new(FileStorage::new(config.session_dir.clone())),
        Arc::new(MockIdentityProvider::new()),
    )?;

    let catalog = Arc::new(InMemoryCatalog::new());
    if config.seed_catalog {
        seed_catalog(catalog.as_ref()).await?;
    }
    let catalog: Arc<dyn CatalogRepository> = catalog;

    let shared_state = Arc::new(AppState::new(
        session,
        catalog,
        Arc::new(SimulatedProcessor::new(config.booking_delay)),
        config.event_buffer_size,
    ));

    let app = api::rest::router(shared_state.clone());

    tokio::spawn(run_idle_sweeper(
        shared_state.clone(),
        config.workflow_idle_timeout,
    ));

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(
        http_port = config.http_port,
        booking_delay_ms = config.booking_delay.as_millis() as u64,
        "http server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
