//! Ownership of the single database connection.
//!
//! Every store operation goes through [`ConnectionSupervisor::acquire`], which
//! hands out the live connection under a mutex. A background task pings the
//! connection on a fixed interval and reopens it when the ping fails, so a
//! dropped link heals on the next tick without any caller retrying.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::DatabaseError;

pub type ConnectionGuard<'a> = MappedMutexGuard<'a, PgConnection>;

pub struct ConnectionSupervisor {
    options: PgConnectOptions,
    ping_timeout: Duration,
    conn: Mutex<Option<PgConnection>>,
}

impl ConnectionSupervisor {
    /// Open the connection. A failure is logged and leaves the handle empty;
    /// the health check keeps trying to reopen it.
    pub async fn connect(options: PgConnectOptions, ping_timeout: Duration) -> Self {
        let conn = open(&options, ping_timeout).await;
        Self {
            options,
            ping_timeout,
            conn: Mutex::new(conn),
        }
    }

    /// Build a supervisor without attempting a connection.
    pub fn detached(options: PgConnectOptions, ping_timeout: Duration) -> Self {
        Self {
            options,
            ping_timeout,
            conn: Mutex::new(None),
        }
    }

    pub async fn acquire(&self) -> Result<ConnectionGuard<'_>, DatabaseError> {
        let guard = self.conn.lock().await;
        MutexGuard::try_map(guard, |slot| slot.as_mut())
            .map_err(|_| DatabaseError::Unavailable("no live database connection".to_string()))
    }

    pub async fn is_connected(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// One liveness pass. Returns whether a usable connection is in place
    /// once the pass is over.
    pub async fn check(&self) -> bool {
        let mut slot = self.conn.lock().await;

        let healthy = match slot.as_mut() {
            Some(conn) => match timeout(self.ping_timeout, conn.ping()).await {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    warn!(error = %e, "Database ping failed");
                    false
                }
                Err(_) => {
                    warn!(
                        timeout_secs = self.ping_timeout.as_secs(),
                        "Database ping timed out"
                    );
                    false
                }
            },
            None => false,
        };

        if healthy {
            debug!("Database connection healthy");
            return true;
        }

        // Drop rather than close: a graceful close on a dead socket can hang.
        slot.take();
        *slot = open(&self.options, self.ping_timeout).await;
        slot.is_some()
    }

    /// Run [`check`](Self::check) every `every`, starting one interval from now.
    pub fn spawn_health_check(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let supervisor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(interval_secs = every.as_secs(), "Database health check started");
            loop {
                ticker.tick().await;
                if !supervisor.check().await {
                    warn!("Database still unreachable; retrying on next tick");
                }
            }
        })
    }

    pub async fn close(&self) {
        if let Some(conn) = self.conn.lock().await.take() {
            if let Err(e) = conn.close().await {
                warn!(error = %e, "Error closing database connection");
            }
        }
    }
}

async fn open(options: &PgConnectOptions, limit: Duration) -> Option<PgConnection> {
    match timeout(limit, PgConnection::connect_with(options)).await {
        Ok(Ok(conn)) => {
            info!("Database connection established");
            Some(conn)
        }
        Ok(Err(e)) => {
            error!(error = %e, "Failed to open database connection");
            None
        }
        Err(_) => {
            error!(
                timeout_secs = limit.as_secs(),
                "Timed out opening database connection"
            );
            None
        }
    }
}
