use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{Role, User};

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

/// Issues identities. The session layer trusts whatever role comes back
/// from here and never derives one from client input itself.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError>;

    async fn enroll(&self, registration: Registration) -> Result<User, AppError>;
}

/// Stand-in provider that accepts any credentials.
///
/// Roles are guessed from the email address (`worker` / `admin` substrings).
/// This is a development placeholder, not an access control.
#[derive(Debug, Default, Clone)]
pub struct MockIdentityProvider;

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self
    }

    fn role_hint(email: &str) -> Role {
        if email.contains("worker") {
            Role::Worker
        } else if email.contains("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn authenticate(&self, email: &str, _password: &str) -> Result<User, AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::BadRequest("email cannot be empty".to_string()));
        }

        let name = email.split('@').next().unwrap_or(email).to_string();

        Ok(User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: Self::role_hint(email),
            name,
            avatar: None,
            location: None,
            created_at: Utc::now(),
        })
    }

    async fn enroll(&self, registration: Registration) -> Result<User, AppError> {
        let email = registration.email.trim();
        if email.is_empty() {
            return Err(AppError::BadRequest("email cannot be empty".to_string()));
        }
        if registration.name.trim().is_empty() {
            return Err(AppError::BadRequest("name cannot be empty".to_string()));
        }
        if registration.role == Role::Admin {
            return Err(AppError::Validation(
                "admin accounts cannot be self-registered".to_string(),
            ));
        }

        Ok(User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: registration.role,
            name: registration.name.trim().to_string(),
            avatar: None,
            location: None,
            created_at: Utc::now(),
        })
    }
}
