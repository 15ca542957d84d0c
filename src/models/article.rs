use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single ingested content item, including its full content, metadata,
/// and ranking-related attributes.
///
/// Created and scored by the (future) ingestion engine; deleted only via
/// cascade when the owning source is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: i64,
    pub source_id: i64,
    /// Unique across all articles.
    pub url: String,
    pub canonical_url: Option<String>,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub tags: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub content_length: Option<i32>,
    pub reading_time_minutes: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
    pub ingested_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub rating: Option<f64>,
    /// Snapshot of the source weight at scoring time.
    pub source_weight: Option<f64>,
    pub freshness_score: Option<f64>,
    pub quality_score: Option<f64>,
    pub final_score: Option<f64>,
}
