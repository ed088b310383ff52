use std::sync::Arc;

use async_trait::async_trait;
use sqlx::Connection;
use tracing::info;

use crate::auth::CredentialLookup;
use crate::db::models::User;
use crate::db::supervisor::ConnectionSupervisor;
use crate::error::DatabaseError;

/// Username/password rows in the `users` table.
#[derive(Clone)]
pub struct CredentialStore {
    supervisor: Arc<ConnectionSupervisor>,
}

impl CredentialStore {
    pub fn new(supervisor: Arc<ConnectionSupervisor>) -> Self {
        Self { supervisor }
    }

    /// Insert a new user. A taken username surfaces as
    /// [`DatabaseError::DuplicateUsername`] and leaves the existing row as is.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), DatabaseError> {
        let mut conn = self.supervisor.acquire().await?;

        sqlx::query("INSERT INTO users (username, password) VALUES ($1, $2)")
            .bind(username)
            .bind(password)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    pub async fn fetch_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let mut conn = self.supervisor.acquire().await?;

        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Exact, case-sensitive match on both fields.
    pub async fn verify_login(&self, username: &str, password: &str) -> Result<bool, DatabaseError> {
        let mut conn = self.supervisor.acquire().await?;

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1 AND password = $2")
                .bind(username)
                .bind(password)
                .fetch_one(&mut *conn)
                .await?;

        Ok(count == 1)
    }

    /// Delete every user and restart the id sequence, as one transaction.
    /// Inventory rows reference users, so clear those first.
    pub async fn reset_all(&self) -> Result<(), DatabaseError> {
        let mut conn = self.supervisor.acquire().await?;
        let mut tx = conn.begin().await?;

        let deleted = sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
        sqlx::query("ALTER SEQUENCE users_id_seq RESTART WITH 1")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(rows = deleted.rows_affected(), "Users table reset");
        Ok(())
    }
}

#[async_trait]
impl CredentialLookup for CredentialStore {
    async fn fetch_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        CredentialStore::fetch_by_username(self, username).await
    }
}
