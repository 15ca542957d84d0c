use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A configured content feed that articles are ingested from.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Source {
    pub id: i64,
    pub name: String,
    /// Globally unique across all sources.
    pub feed_url: String,
    pub site_url: Option<String>,
    pub source_type: String,
    /// Multiplier applied by downstream scoring.
    pub source_weight: Option<f64>,
    pub is_active: bool,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
