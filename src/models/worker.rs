use serde::{Deserialize, Serialize};

use crate::models::service::Service;
use crate::models::user::User;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Busy,
    Offline,
}

/// A user offering services. `profile.role` is always `Role::Worker`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(flatten)]
    pub profile: User,
    pub rating: f64,
    pub total_jobs: u32,
    pub is_verified: bool,
    pub availability: Availability,
    pub hourly_rate: f64,
    pub description: String,
    pub skills: Vec<String>,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Worker {
    pub fn id(&self) -> &str {
        &self.profile.id
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }
}
