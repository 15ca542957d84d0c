//! Persisted entity types, mirroring the tables declared in
//! [`crate::db::schema`].

mod article;
mod ingestion_run;
mod ingestion_source_run;
mod source;

pub use article::Article;
pub use ingestion_run::{IngestionRun, RunStatus};
pub use ingestion_source_run::{IngestionSourceRun, SourceRunStatus};
pub use source::Source;
