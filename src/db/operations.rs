use std::sync::Arc;

use tracing::info;

use crate::db::credentials::CredentialStore;
use crate::db::inventory::InventoryStore;
use crate::db::schema;
use crate::db::supervisor::ConnectionSupervisor;
use crate::error::DatabaseError;

/// The stores, bound to one supervised connection.
#[derive(Clone)]
pub struct DbOperations {
    supervisor: Arc<ConnectionSupervisor>,
    credentials: CredentialStore,
    inventory: InventoryStore,
}

impl DbOperations {
    pub fn new(supervisor: Arc<ConnectionSupervisor>) -> Self {
        Self {
            credentials: CredentialStore::new(Arc::clone(&supervisor)),
            inventory: InventoryStore::new(Arc::clone(&supervisor)),
            supervisor,
        }
    }

    pub fn supervisor(&self) -> &Arc<ConnectionSupervisor> {
        &self.supervisor
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn inventory(&self) -> &InventoryStore {
        &self.inventory
    }

    /// Create the `users` and `inventory` tables if they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), DatabaseError> {
        let mut conn = self.supervisor.acquire().await?;
        for stmt in schema::statements() {
            sqlx::query(stmt).execute(&mut *conn).await?;
        }
        info!("Database schema ready");
        Ok(())
    }

    /// Wipe both tables and restart their id sequences. Test and
    /// maintenance use only.
    pub async fn clean_database(&self) -> Result<(), DatabaseError> {
        self.inventory.reset_all().await?;
        self.credentials.reset_all().await
    }
}
