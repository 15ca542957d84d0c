use thiserror::Error;

use crate::db::DbError;

/// Top-level application error. Every variant is fatal at startup;
/// there is no partial-service mode.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("database error: {0}")]
    Database(#[from] DbError),
}

pub type Result<T> = std::result::Result<T, AppError>;
