use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, FromRow, Postgres, Type};

/// Outcome of ingesting a single source within one run.
///
/// Stored as lowercase text in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceRunStatus {
    Success,
    Failed,
}

impl SourceRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceRunStatus::Success => "success",
            SourceRunStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SourceRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceRunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(SourceRunStatus::Success),
            "failed" => Ok(SourceRunStatus::Failed),
            other => Err(format!("unknown source run status: {other}")),
        }
    }
}

impl Type<Postgres> for SourceRunStatus {
    fn type_info() -> PgTypeInfo {
        <&str as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for SourceRunStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <&str as Decode<Postgres>>::decode(value)?;
        Ok(s.parse::<SourceRunStatus>()?)
    }
}

impl<'q> Encode<'q, Postgres> for SourceRunStatus {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <&str as Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

/// The ingestion outcome for one source during a specific run.
///
/// `source_id` is nullable: when a source is deleted its run history is
/// preserved with the reference cleared, unlike articles which cascade.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IngestionSourceRun {
    pub id: i64,
    pub ingestion_run_id: i64,
    pub source_id: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: SourceRunStatus,
    pub articles_fetched: i32,
    pub articles_inserted: i32,
    pub articles_updated: i32,
    pub error_message: Option<String>,
}
