#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use inventory_server::{ConnectionSupervisor, DbOperations};
use sqlx::postgres::PgConnectOptions;
use tokio::sync::{Mutex, MutexGuard};

/// Database tests reset the id sequences, so they take turns.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

pub struct TestDb {
    pub db: DbOperations,
    _guard: MutexGuard<'static, ()>,
}

/// A clean database from `DATABASE_URL`, or `None` when it is not set.
pub async fn test_db() -> Option<TestDb> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping database test");
            return None;
        }
    };

    let guard = DB_LOCK.lock().await;
    let options: PgConnectOptions = url.parse().expect("Invalid DATABASE_URL");
    let supervisor = ConnectionSupervisor::connect(options, Duration::from_secs(10)).await;
    let db = DbOperations::new(Arc::new(supervisor));

    db.init_schema().await.expect("Failed to create schema");
    db.clean_database().await.expect("Failed to clean database");

    Some(TestDb { db, _guard: guard })
}

pub fn unreachable_db() -> DbOperations {
    let options = PgConnectOptions::new().host("127.0.0.1").port(1);
    DbOperations::new(Arc::new(ConnectionSupervisor::detached(
        options,
        Duration::from_secs(1),
    )))
}

/// A second, independent handle on the `DATABASE_URL` database. It sees only
/// what other connections have committed.
pub async fn observer_db() -> DbOperations {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let options: PgConnectOptions = url.parse().expect("Invalid DATABASE_URL");
    let supervisor = ConnectionSupervisor::connect(options, Duration::from_secs(10)).await;
    assert!(supervisor.is_connected().await, "observer connection failed");
    DbOperations::new(Arc::new(supervisor))
}
