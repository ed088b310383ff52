use serde::Serialize;

use crate::auth::gate::AuthGate;
use crate::db::models::InventoryItem;
use crate::db::{CredentialStore, InventoryStore};
use crate::error::{AppError, AuthError};

/// What a successful register or login hands back: the user's current
/// inventory plus the bearer token for later inventory calls.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub data: Vec<InventoryItem>,
    pub auth: String,
}

#[derive(Clone)]
pub struct AuthService {
    credentials: CredentialStore,
    inventory: InventoryStore,
}

impl AuthService {
    pub fn new(credentials: CredentialStore, inventory: InventoryStore) -> Self {
        Self {
            credentials,
            inventory,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Session, AppError> {
        self.credentials.register(username, password).await?;
        self.open_session(username, password).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AppError> {
        if !self.credentials.verify_login(username, password).await? {
            return Err(AuthError::InvalidCredentials.into());
        }
        self.open_session(username, password).await
    }

    async fn open_session(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let data = self.inventory.list_for_user(username).await?;
        Ok(Session {
            data,
            auth: AuthGate::derive_token(username, password),
        })
    }
}
