//! PostgreSQL connection lifecycle management.
//!
//! The [`ConnectionManager`] is the sole owner of the process's connection
//! pool. Components receive it by `Arc` and go through [`acquire`] for all
//! database access; nothing else may close or replace the pool.
//!
//! [`acquire`]: ConnectionManager::acquire

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::DatabaseConfig;

/// Errors from the database layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database was unreachable or the validation query failed.
    /// Fatal during startup; reportable during a health check.
    #[error("database connection failed: {0}")]
    Connection(#[from] sqlx::Error),

    /// `acquire` was called before a successful `connect`. An ordering
    /// defect in the caller, never a transient condition; do not retry.
    #[error("database connection not initialized")]
    Uninitialized,

    /// Table or index creation failed. Fatal at startup.
    #[error("schema creation failed for {table}: {source}")]
    Schema {
        table: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Owns the connection pool for the process lifetime.
pub struct ConnectionManager {
    config: DatabaseConfig,
    pool: RwLock<Option<PgPool>>,
}

impl ConnectionManager {
    /// Create an unconnected manager. No I/O happens until `connect`.
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: RwLock::new(None),
        }
    }

    /// Establish the connection pool.
    ///
    /// Idempotent: returns immediately when a live pool already exists.
    /// Otherwise opens a pool with a bounded acquire timeout and validates
    /// it with a trivial round-trip query. Each statement executed through
    /// the pool commits on its own unless the caller opens an explicit
    /// transaction.
    ///
    /// Holds the pool lock for the whole dial-and-validate sequence, so
    /// concurrent `acquire`/`ping` callers wait out a (re)connect rather
    /// than observing a half-installed pool. Bounded by the connect
    /// timeout; `connect` only runs at startup or on a manual reconnect.
    pub async fn connect(&self) -> Result<(), DbError> {
        let mut guard = self.pool.write().await;

        if let Some(pool) = guard.as_ref() {
            if !pool.is_closed() {
                tracing::debug!("PostgreSQL connection already initialized");
                return Ok(());
            }
        }

        tracing::info!(
            url = %self.config.connection_url_masked(),
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(self.config.pool_size)
            .acquire_timeout(Duration::from_secs(self.config.connect_timeout_seconds))
            .connect(&self.config.connection_url())
            .await?;

        // Verify connection
        sqlx::query("SELECT 1").execute(&pool).await?;

        *guard = Some(pool);
        tracing::info!("PostgreSQL connection successful");
        Ok(())
    }

    /// Get a handle to the active pool.
    ///
    /// Fails with [`DbError::Uninitialized`] before `connect` has
    /// succeeded. `PgPool` is a cheap reference-counted handle; cloning it
    /// does not open new connections.
    pub async fn acquire(&self) -> Result<PgPool, DbError> {
        let guard = self.pool.read().await;
        match guard.as_ref() {
            Some(pool) if !pool.is_closed() => Ok(pool.clone()),
            _ => Err(DbError::Uninitialized),
        }
    }

    /// Trivial round-trip query against the active pool.
    pub async fn ping(&self) -> Result<(), DbError> {
        let pool = self.acquire().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close the pool and clear internal state.
    ///
    /// Idempotent: a no-op when no pool exists. A subsequent `connect`
    /// re-establishes cleanly.
    pub async fn close(&self) {
        let mut guard = self.pool.write().await;
        if let Some(pool) = guard.take() {
            tracing::info!("Closing PostgreSQL connection pool");
            pool.close().await;
            tracing::info!("PostgreSQL connection pool closed");
        }
    }

    /// Whether a live pool is currently held.
    pub async fn is_connected(&self) -> bool {
        let guard = self.pool.read().await;
        matches!(guard.as_ref(), Some(pool) if !pool.is_closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    fn unreachable_config() -> DatabaseConfig {
        // Port 1 is never a PostgreSQL listener; connect fails fast.
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            db: "database".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            connect_timeout_seconds: 1,
            pool_size: 1,
        }
    }

    #[tokio::test]
    async fn test_acquire_before_connect_fails() {
        let manager = ConnectionManager::new(unreachable_config());
        let err = tokio_test::assert_err!(manager.acquire().await);
        assert!(matches!(err, DbError::Uninitialized));
    }

    #[tokio::test]
    async fn test_ping_before_connect_fails() {
        let manager = ConnectionManager::new(unreachable_config());
        let err = manager.ping().await.unwrap_err();
        assert!(matches!(err, DbError::Uninitialized));
    }

    #[tokio::test]
    async fn test_close_unconnected_is_noop() {
        let manager = ConnectionManager::new(unreachable_config());
        manager.close().await;
        assert!(!manager.is_connected().await);

        // Still uninitialized afterwards
        let err = manager.acquire().await.unwrap_err();
        assert!(matches!(err, DbError::Uninitialized));
    }

    #[tokio::test]
    async fn test_connect_unreachable_fails_with_connection_error() {
        let manager = ConnectionManager::new(unreachable_config());
        let err = manager.connect().await.unwrap_err();
        assert!(matches!(err, DbError::Connection(_)));
        assert!(!manager.is_connected().await);
    }

    #[test]
    fn test_error_display() {
        let err = DbError::Uninitialized;
        assert_eq!(format!("{}", err), "database connection not initialized");
    }
}
