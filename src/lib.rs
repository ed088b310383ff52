pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod inventory;

use std::sync::Arc;
use actix_web::{web, HttpResponse};
use sqlx::postgres::PgConnectOptions;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthGate, AuthService, CredentialLookup, Session};
pub use db::{ConnectionSupervisor, DbOperations, InventoryItem, ItemUpdate, User};
pub use inventory::InventoryService;

/// Health check endpoint handler
/// Reports whether the supervised database connection is currently open.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let connected = state.db.supervisor().is_connected().await;

    HttpResponse::Ok().json(serde_json::json!({
        "status": if connected { "healthy" } else { "degraded" },
        "database": connected,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Register every route on an actix `App`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(err.to_string()).into()
    }))
    .route("/health", web::get().to(health_check))
    .route("/register", web::post().to(auth::handlers::register))
    .route("/login", web::post().to(auth::handlers::login))
    .route("/inventory/add", web::post().to(inventory::handlers::add_item))
    .route("/inventory/update", web::put().to(inventory::handlers::update_items))
    .route("/inventory/delete", web::delete().to(inventory::handlers::delete_item));
}

/// Application state shared across all components
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db: DbOperations,
    pub auth_service: Arc<AuthService>,
    pub inventory_service: Arc<InventoryService>,
}

impl AppState {
    /// Resolve connection parameters and open the supervised connection.
    /// Unusable parameters are an error; an unreachable database is not, the
    /// health check reconnects once it comes up.
    pub async fn new(config: Settings) -> Result<Self> {
        let url = config.database.connection_string()?;
        let options: PgConnectOptions = url.parse().map_err(|e: sqlx::Error| {
            AppError::ConfigError(format!("invalid database connection string: {}", e))
        })?;

        let supervisor = ConnectionSupervisor::connect(options, config.database.ping_timeout()).await;
        let db = DbOperations::new(Arc::new(supervisor));

        if config.database.init_schema {
            if let Err(e) = db.init_schema().await {
                warn!(error = %e, "Schema bootstrap skipped");
            }
        }

        Ok(Self::with_db(config, db))
    }

    pub fn with_db(config: Settings, db: DbOperations) -> Self {
        let gate = AuthGate::new(Arc::new(db.credentials().clone()));

        Self {
            config: Arc::new(config),
            auth_service: Arc::new(AuthService::new(
                db.credentials().clone(),
                db.inventory().clone(),
            )),
            inventory_service: Arc::new(InventoryService::new(db.inventory().clone(), gate)),
            db,
        }
    }

    pub fn spawn_health_check(&self) -> JoinHandle<()> {
        self.db
            .supervisor()
            .spawn_health_check(self.config.database.health_check_interval())
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.db.supervisor().close().await;
        info!("Database connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn detached_db() -> DbOperations {
        let options = PgConnectOptions::new().host("127.0.0.1").port(1);
        DbOperations::new(Arc::new(ConnectionSupervisor::detached(
            options,
            Duration::from_secs(1),
        )))
    }

    #[tokio::test]
    async fn test_app_state_clone() {
        let config = Settings::new_for_test().expect("Failed to load test config");
        let state = AppState::with_db(config, detached_db());

        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.config, &cloned.config));
        assert!(Arc::ptr_eq(state.db.supervisor(), cloned.db.supervisor()));
        assert!(Arc::ptr_eq(&state.auth_service, &cloned.auth_service));
    }

    #[tokio::test]
    async fn test_invalid_connection_string() {
        let mut config = Settings::new_for_test().expect("Failed to load test config");
        config.database.url = Some("not a url".to_string());

        match AppState::new(config).await {
            Err(AppError::ConfigError(_)) => (),
            Err(e) => panic!("Expected config error, got {}", e),
            Ok(_) => panic!("Expected config error"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_database_still_builds_state() {
        let mut config = Settings::new_for_test().expect("Failed to load test config");
        config.database.url = Some("postgres://nobody@127.0.0.1:1/nothing".to_string());
        config.database.ping_timeout_secs = 2;

        let state = AppState::new(config).await.expect("state should build");
        assert!(!state.db.supervisor().is_connected().await);
        state.shutdown().await.unwrap();
    }
}
