//! Database error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already queued in a non-terminal state: {0}")]
    Duplicate(String),

    #[error("Invalid transition for item {id}: {status} -> {requested}")]
    InvalidTransition {
        id: String,
        status: String,
        requested: &'static str,
    },

    #[error("Retry limit reached for item {id} ({retry_count} attempts)")]
    RetryExhausted { id: String, retry_count: i32 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Other(String),
}

pub type DbResult<T> = Result<T, DbError>;
