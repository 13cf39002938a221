use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::user::{Role, User};
use crate::session::identity::{IdentityProvider, Registration};
use crate::session::storage::SessionStorage;

/// Storage slot holding the serialized session record.
pub const SESSION_KEY: &str = "user";

/// The active session, passed explicitly to whoever needs it.
///
/// Built once with [`SessionContext::initialize`], which restores any
/// persisted record; [`SessionContext::logout`] is the teardown.
pub struct SessionContext {
    storage: Arc<dyn SessionStorage>,
    identity: Arc<dyn IdentityProvider>,
    current: RwLock<Option<User>>,
}

impl SessionContext {
    pub fn initialize(
        storage: Arc<dyn SessionStorage>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppError> {
        let restored = match storage.get_item(SESSION_KEY)? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => {
                    info!(user_id = %user.id, role = %user.role, "restored persisted session");
                    Some(user)
                }
                Err(err) => {
                    warn!(error = %err, "discarding unreadable session record");
                    storage.remove_item(SESSION_KEY)?;
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            storage,
            identity,
            current: RwLock::new(restored),
        })
    }

    pub async fn current(&self) -> Option<User> {
        self.current.read().await.clone()
    }

    pub async fn require(&self) -> Result<User, AppError> {
        self.current().await.ok_or(AppError::Unauthorized)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self.identity.authenticate(email, password).await?;
        self.activate(user).await
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let user = self
            .identity
            .enroll(Registration {
                email: email.to_string(),
                password: password.to_string(),
                name: name.to_string(),
                role,
            })
            .await?;
        self.activate(user).await
    }

    /// Clears the active session and its persisted copy. Returns the user
    /// that was signed in, if any.
    pub async fn logout(&self) -> Result<Option<User>, AppError> {
        let mut current = self.current.write().await;
        self.storage.remove_item(SESSION_KEY)?;
        let previous = current.take();

        if let Some(user) = &previous {
            info!(user_id = %user.id, "session ended");
        }
        Ok(previous)
    }

    async fn activate(&self, user: User) -> Result<User, AppError> {
        let raw = serde_json::to_string(&user)
            .map_err(|err| AppError::Internal(format!("failed to encode session: {err}")))?;

        let mut current = self.current.write().await;
        self.storage.set_item(SESSION_KEY, &raw)?;
        *current = Some(user.clone());

        info!(user_id = %user.id, role = %user.role, "session started");
        Ok(user)
    }
}
