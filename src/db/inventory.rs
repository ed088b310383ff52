use std::sync::Arc;

use sqlx::Connection;
use tracing::{debug, info};

use crate::db::models::{InventoryItem, ItemUpdate};
use crate::db::supervisor::ConnectionSupervisor;
use crate::error::DatabaseError;

/// Statements grouped into one round trip by [`InventoryStore::update_items`].
pub const UPDATE_BATCH_SIZE: usize = 10;

#[derive(Clone)]
pub struct InventoryStore {
    supervisor: Arc<ConnectionSupervisor>,
}

impl InventoryStore {
    pub fn new(supervisor: Arc<ConnectionSupervisor>) -> Self {
        Self { supervisor }
    }

    /// Items owned by `username`, in the order the store returns them.
    pub async fn list_for_user(&self, username: &str) -> Result<Vec<InventoryItem>, DatabaseError> {
        let mut conn = self.supervisor.acquire().await?;

        let items = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT id, productname AS name, amount, userid AS owner
            FROM inventory
            WHERE userid IN (SELECT id FROM users WHERE username = $1)
            "#,
        )
        .bind(username)
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }

    /// Insert one item for the user named `username` and return its id.
    /// An unknown username inserts nothing and yields [`DatabaseError::NotFound`].
    pub async fn add_item(
        &self,
        name: &str,
        amount: i32,
        username: &str,
    ) -> Result<i32, DatabaseError> {
        let mut conn = self.supervisor.acquire().await?;

        let row: Option<(i32,)> = sqlx::query_as(
            r#"
            INSERT INTO inventory (productname, amount, userid)
            SELECT $1, $2, id FROM users WHERE username = $3
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(amount)
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(|(id,)| id).ok_or(DatabaseError::NotFound)
    }

    /// Apply name/amount to each row by id, [`UPDATE_BATCH_SIZE`] rows per
    /// statement. Later entries for the same id win. Batches are not wrapped
    /// in a transaction: if one fails the earlier ones stay applied.
    /// Ownership is not checked here.
    pub async fn update_items(&self, items: &[ItemUpdate]) -> Result<(), DatabaseError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut conn = self.supervisor.acquire().await?;

        for chunk in items.chunks(UPDATE_BATCH_SIZE) {
            // a join against repeated ids picks an arbitrary row
            let batch = latest_per_id(chunk);
            let ids: Vec<i32> = batch.iter().map(|i| i.id).collect();
            let names: Vec<String> = batch.iter().map(|i| i.name.clone()).collect();
            let amounts: Vec<i32> = batch.iter().map(|i| i.amount).collect();

            let result = sqlx::query(
                r#"
                UPDATE inventory AS inv
                SET productname = batch.name, amount = batch.amount
                FROM UNNEST($1::int4[], $2::text[], $3::int4[]) AS batch(id, name, amount)
                WHERE inv.id = batch.id
                "#,
            )
            .bind(&ids)
            .bind(&names)
            .bind(&amounts)
            .execute(&mut *conn)
            .await?;

            debug!(
                batch_len = chunk.len(),
                rows = result.rows_affected(),
                "Flushed inventory update batch"
            );
        }

        Ok(())
    }

    /// Delete the row with `id`. Deleting a missing id is not an error.
    pub async fn delete_item(&self, id: i32) -> Result<(), DatabaseError> {
        let mut conn = self.supervisor.acquire().await?;

        sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Delete every item and restart the id sequence at 1, as one transaction.
    pub async fn reset_all(&self) -> Result<(), DatabaseError> {
        let mut conn = self.supervisor.acquire().await?;
        let mut tx = conn.begin().await?;

        let deleted = sqlx::query("DELETE FROM inventory").execute(&mut *tx).await?;
        sqlx::query("ALTER SEQUENCE inventory_id_seq RESTART WITH 1")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(rows = deleted.rows_affected(), "Inventory table reset");
        Ok(())
    }
}

/// Collapse repeated ids to their last entry, keeping first-seen order.
fn latest_per_id(chunk: &[ItemUpdate]) -> Vec<&ItemUpdate> {
    let mut latest: Vec<&ItemUpdate> = Vec::with_capacity(chunk.len());
    for item in chunk {
        match latest.iter().position(|seen| seen.id == item.id) {
            Some(pos) => latest[pos] = item,
            None => latest.push(item),
        }
    }
    latest
}
