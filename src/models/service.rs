use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::location::GeoLocation;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub worker_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    /// Minutes.
    pub duration: u32,
    pub images: Vec<String>,
    pub location: GeoLocation,
    pub created_at: DateTime<Utc>,
}

/// Partial update applied by `CatalogRepository::update_service`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<u32>,
    pub images: Option<Vec<String>>,
    pub location: Option<GeoLocation>,
}

impl ServicePatch {
    pub fn apply(self, service: &mut Service) {
        if let Some(title) = self.title {
            service.title = title;
        }
        if let Some(description) = self.description {
            service.description = description;
        }
        if let Some(category) = self.category {
            service.category = category;
        }
        if let Some(price) = self.price {
            service.price = price;
        }
        if let Some(duration) = self.duration {
            service.duration = duration;
        }
        if let Some(images) = self.images {
            service.images = images;
        }
        if let Some(location) = self.location {
            service.location = location;
        }
    }
}
