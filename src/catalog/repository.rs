use async_trait::async_trait;
use dashmap::DashMap;

use crate::catalog::filter::{filter_services, CatalogFilter, ALL_CATEGORIES};
use crate::catalog::seed::CATEGORIES;
use crate::error::AppError;
use crate::models::service::{Service, ServicePatch};
use crate::models::user::Role;
use crate::models::worker::Worker;

/// Data access for services and the workers offering them.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Store a new service. The owning worker must already exist.
    async fn create_service(&self, service: Service) -> Result<Service, AppError>;

    async fn get_service(&self, id: &str) -> Result<Option<Service>, AppError>;

    async fn update_service(&self, id: &str, patch: ServicePatch) -> Result<Service, AppError>;

    async fn list_services(&self) -> Result<Vec<Service>, AppError>;

    async fn query_services(&self, filter: &CatalogFilter) -> Result<Vec<Service>, AppError> {
        let services = self.list_services().await?;
        Ok(filter_services(&services, filter))
    }

    async fn create_worker(&self, worker: Worker) -> Result<Worker, AppError>;

    /// Worker with `services` filled from the catalog.
    async fn get_worker(&self, id: &str) -> Result<Option<Worker>, AppError>;

    async fn list_workers(&self) -> Result<Vec<Worker>, AppError>;
}

#[derive(Default)]
pub struct InMemoryCatalog {
    services: DashMap<String, Service>,
    workers: DashMap<String, Worker>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn services_of(&self, worker_id: &str) -> Vec<Service> {
        let mut owned: Vec<Service> = self
            .services
            .iter()
            .filter(|entry| entry.value().worker_id == worker_id)
            .map(|entry| entry.value().clone())
            .collect();
        sort_services(&mut owned);
        owned
    }
}

/// Field rules shared by creation and partial updates.
fn validate_service(service: &Service) -> Result<(), AppError> {
    if service.title.trim().is_empty() {
        return Err(AppError::BadRequest("title cannot be empty".to_string()));
    }
    if service.price < 0.0 {
        return Err(AppError::BadRequest("price must be >= 0".to_string()));
    }
    if service.category == ALL_CATEGORIES || !CATEGORIES.contains(&service.category.as_str()) {
        return Err(AppError::BadRequest(format!(
            "unknown category: {}",
            service.category
        )));
    }
    Ok(())
}

fn sort_services(services: &mut [Service]) {
    services.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn create_service(&self, service: Service) -> Result<Service, AppError> {
        validate_service(&service)?;
        if !self.workers.contains_key(&service.worker_id) {
            return Err(AppError::NotFound(format!(
                "worker {} not found",
                service.worker_id
            )));
        }
        if self.services.contains_key(&service.id) {
            return Err(AppError::Conflict(format!(
                "service {} already exists",
                service.id
            )));
        }

        self.services.insert(service.id.clone(), service.clone());
        Ok(service)
    }

    async fn get_service(&self, id: &str) -> Result<Option<Service>, AppError> {
        Ok(self.services.get(id).map(|entry| entry.value().clone()))
    }

    async fn update_service(&self, id: &str, patch: ServicePatch) -> Result<Service, AppError> {
        let mut entry = self
            .services
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("service {} not found", id)))?;

        // stored entry only changes once the patched copy passes
        let mut patched = entry.value().clone();
        patch.apply(&mut patched);
        validate_service(&patched)?;

        *entry = patched.clone();
        Ok(patched)
    }

    async fn list_services(&self) -> Result<Vec<Service>, AppError> {
        let mut services: Vec<Service> = self
            .services
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        sort_services(&mut services);
        Ok(services)
    }

    async fn create_worker(&self, worker: Worker) -> Result<Worker, AppError> {
        if worker.profile.role != Role::Worker {
            return Err(AppError::BadRequest(format!(
                "worker profile must carry the worker role, got {}",
                worker.profile.role
            )));
        }
        if self.workers.contains_key(worker.id()) {
            return Err(AppError::Conflict(format!(
                "worker {} already exists",
                worker.id()
            )));
        }

        let mut stored = worker.clone();
        stored.services.clear();
        self.workers.insert(stored.id().to_string(), stored);
        Ok(worker)
    }

    async fn get_worker(&self, id: &str) -> Result<Option<Worker>, AppError> {
        let worker = self.workers.get(id).map(|entry| entry.value().clone());
        Ok(worker.map(|mut worker| {
            worker.services = self.services_of(id);
            worker
        }))
    }

    async fn list_workers(&self) -> Result<Vec<Worker>, AppError> {
        let mut workers: Vec<Worker> = self
            .workers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        workers.sort_by(|a, b| a.id().cmp(b.id()));

        for worker in &mut workers {
            worker.services = self.services_of(worker.id());
        }
        Ok(workers)
    }
}
