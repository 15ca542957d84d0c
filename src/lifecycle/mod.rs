//! Application lifecycle orchestration.
//!
//! Drives the startup order (connect, then ensure schema) and the
//! shutdown order (close the pool), tracking the current phase:
//!
//! `NotStarted → Connecting → SchemaReady → Serving → ShuttingDown → Stopped`
//!
//! Any failure while connecting or bootstrapping the schema is fatal;
//! the process must not accept requests with a partially initialized
//! database layer. Shutdown is safe to run from any phase, including
//! after a failed startup.

use std::sync::{Arc, RwLock};

use crate::db::{schema, ConnectionManager, SchemaDefinition};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    NotStarted,
    Connecting,
    SchemaReady,
    Serving,
    ShuttingDown,
    Stopped,
}

pub struct Lifecycle {
    db: Arc<ConnectionManager>,
    schema: SchemaDefinition,
    phase: RwLock<LifecyclePhase>,
}

impl Lifecycle {
    pub fn new(db: Arc<ConnectionManager>) -> Self {
        Self {
            db,
            schema: schema(),
            phase: RwLock::new(LifecyclePhase::NotStarted),
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        *self.phase.read().unwrap_or_else(|e| e.into_inner())
    }

    fn set_phase(&self, next: LifecyclePhase) {
        let mut guard = self.phase.write().unwrap_or_else(|e| e.into_inner());
        tracing::debug!(from = ?*guard, to = ?next, "Lifecycle transition");
        *guard = next;
    }

    /// Run the startup sequence: connect, then ensure the schema.
    ///
    /// On error the caller must still invoke [`shutdown`](Self::shutdown)
    /// before exiting; it is safe on a partially initialized manager.
    pub async fn startup(&self) -> Result<()> {
        self.set_phase(LifecyclePhase::Connecting);
        self.db.connect().await?;

        let pool = self.db.acquire().await?;
        self.schema.ensure(&pool).await?;
        self.set_phase(LifecyclePhase::SchemaReady);

        Ok(())
    }

    /// Record that the listener is bound and requests are being accepted.
    pub fn mark_serving(&self) {
        self.set_phase(LifecyclePhase::Serving);
    }

    /// Close the database pool unconditionally and land in `Stopped`.
    ///
    /// Idempotent; runs on every exit path, normal or failed.
    pub async fn shutdown(&self) {
        self.set_phase(LifecyclePhase::ShuttingDown);
        self.db.close().await;
        self.set_phase(LifecyclePhase::Stopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    fn unreachable_manager() -> Arc<ConnectionManager> {
        Arc::new(ConnectionManager::new(DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            db: "database".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            connect_timeout_seconds: 1,
            pool_size: 1,
        }))
    }

    #[test]
    fn test_initial_phase() {
        let lifecycle = Lifecycle::new(unreachable_manager());
        assert_eq!(lifecycle.phase(), LifecyclePhase::NotStarted);
    }

    #[tokio::test]
    async fn test_failed_startup_then_cleanup() {
        let lifecycle = Lifecycle::new(unreachable_manager());

        let result = lifecycle.startup().await;
        assert!(result.is_err());
        assert_eq!(lifecycle.phase(), LifecyclePhase::Connecting);

        // Cleanup always runs, even after a failed startup
        lifecycle.shutdown().await;
        assert_eq!(lifecycle.phase(), LifecyclePhase::Stopped);
    }

    #[tokio::test]
    async fn test_shutdown_without_startup() {
        let lifecycle = Lifecycle::new(unreachable_manager());
        lifecycle.shutdown().await;
        assert_eq!(lifecycle.phase(), LifecyclePhase::Stopped);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let lifecycle = Lifecycle::new(unreachable_manager());
        lifecycle.shutdown().await;
        lifecycle.shutdown().await;
        assert_eq!(lifecycle.phase(), LifecyclePhase::Stopped);
    }
}
