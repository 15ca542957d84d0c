use std::sync::Arc;

use crate::config::Settings;
use crate::db::ConnectionManager;

/// Shared state handed to every request handler.
///
/// The connection manager is dependency-injected here rather than held as
/// process-global state; handlers reach the database only through it.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: Arc<ConnectionManager>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let db = Arc::new(ConnectionManager::new(settings.database.clone()));

        Self {
            settings: Arc::new(settings),
            db,
        }
    }
}
