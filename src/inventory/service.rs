use tracing::info;

use crate::auth::AuthGate;
use crate::db::models::ItemUpdate;
use crate::db::InventoryStore;
use crate::error::AppError;

/// Token-guarded inventory mutations. Every call authorizes first and
/// touches the store only once the token checks out.
#[derive(Clone)]
pub struct InventoryService {
    inventory: InventoryStore,
    gate: AuthGate,
}

impl InventoryService {
    pub fn new(inventory: InventoryStore, gate: AuthGate) -> Self {
        Self { inventory, gate }
    }

    pub async fn add_item(
        &self,
        token: &str,
        username: &str,
        name: &str,
        amount: i32,
    ) -> Result<i32, AppError> {
        self.gate.authorize(username, token).await?;
        let id = self.inventory.add_item(name, amount, username).await?;
        info!(id, username = %username, "Inventory item added");
        Ok(id)
    }

    pub async fn update_items(
        &self,
        token: &str,
        username: &str,
        items: &[ItemUpdate],
    ) -> Result<(), AppError> {
        self.gate.authorize(username, token).await?;
        self.inventory.update_items(items).await?;
        info!(count = items.len(), username = %username, "Inventory items updated");
        Ok(())
    }

    pub async fn delete_item(&self, token: &str, username: &str, id: i32) -> Result<(), AppError> {
        self.gate.authorize(username, token).await?;
        self.inventory.delete_item(id).await?;
        info!(id, username = %username, "Inventory item deleted");
        Ok(())
    }
}
