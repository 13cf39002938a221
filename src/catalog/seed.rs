use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::info;

use crate::catalog::repository::CatalogRepository;
use crate::error::AppError;
use crate::models::location::GeoLocation;
use crate::models::service::Service;
use crate::models::user::{Role, User};
use crate::models::worker::{Availability, Worker};

pub const CATEGORIES: [&str; 6] = [
    "all",
    "cleaning",
    "gardening",
    "plumbing",
    "electrical",
    "painting",
];

#[derive(Debug, Clone, Serialize)]
pub struct MapLocation {
    #[serde(flatten)]
    pub location: GeoLocation,
    pub services: u32,
}

fn launch_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn worker_profile(id: &str, email: &str, name: &str, avatar: &str) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        role: Role::Worker,
        name: name.to_string(),
        avatar: Some(avatar.to_string()),
        location: None,
        created_at: launch_date(),
    }
}

pub fn seed_workers() -> Vec<Worker> {
    vec![
        Worker {
            profile: worker_profile(
                "1",
                "worker1@example.com",
                "Alice Johnson",
                "https://images.unsplash.com/photo-1494790108755-2616b612b47c",
            ),
            rating: 4.8,
            total_jobs: 127,
            is_verified: true,
            availability: Availability::Available,
            hourly_rate: 25.0,
            description: "Professional cleaner with 5+ years experience".to_string(),
            skills: vec!["cleaning".to_string(), "organizing".to_string()],
            services: Vec::new(),
        },
        Worker {
            profile: worker_profile(
                "2",
                "worker2@example.com",
                "Bob Smith",
                "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e",
            ),
            rating: 4.6,
            total_jobs: 89,
            is_verified: true,
            availability: Availability::Available,
            hourly_rate: 35.0,
            description: "Expert gardener and landscaper".to_string(),
            skills: vec!["gardening".to_string(), "landscaping".to_string()],
            services: Vec::new(),
        },
    ]
}

pub fn seed_services() -> Vec<Service> {
    vec![
        Service {
            id: "1".to_string(),
            worker_id: "1".to_string(),
            title: "Professional House Cleaning".to_string(),
            description: "Complete house cleaning including kitchen, bathrooms, bedrooms, and \
                          living areas. All supplies included."
                .to_string(),
            category: "cleaning".to_string(),
            price: 80.0,
            duration: 120,
            images: vec!["https://images.unsplash.com/photo-1581578731548-c64695cc6952".to_string()],
            location: GeoLocation::new(40.7128, -74.0060, "New York, NY"),
            created_at: launch_date(),
        },
        Service {
            id: "2".to_string(),
            worker_id: "2".to_string(),
            title: "Garden Maintenance & Landscaping".to_string(),
            description: "Complete garden care including pruning, weeding, planting, and basic \
                          landscaping services."
                .to_string(),
            category: "gardening".to_string(),
            price: 120.0,
            duration: 180,
            images: vec!["https://images.unsplash.com/photo-1416879595882-3373a0480b5b".to_string()],
            location: GeoLocation::new(40.7589, -73.9851, "Manhattan, NY"),
            created_at: launch_date(),
        },
    ]
}

pub fn map_locations() -> Vec<MapLocation> {
    vec![
        MapLocation {
            location: GeoLocation::new(40.7128, -74.0060, "New York, NY"),
            services: 15,
        },
        MapLocation {
            location: GeoLocation::new(34.0522, -118.2437, "Los Angeles, CA"),
            services: 12,
        },
        MapLocation {
            location: GeoLocation::new(41.8781, -87.6298, "Chicago, IL"),
            services: 8,
        },
        MapLocation {
            location: GeoLocation::new(29.7604, -95.3698, "Houston, TX"),
            services: 6,
        },
    ]
}

pub async fn seed_catalog(catalog: &dyn CatalogRepository) -> Result<(), AppError> {
    let workers = seed_workers();
    let services = seed_services();
    let (worker_count, service_count) = (workers.len(), services.len());

    for worker in workers {
        catalog.create_worker(worker).await?;
    }
    for service in services {
        catalog.create_service(service).await?;
    }

    info!(workers = worker_count, services = service_count, "catalog seeded");
    Ok(())
}
