//! Docfold DB - SQLite persistence for the processing queue and chunk sink.

mod database;
mod error;
mod migrations;
mod operations;

pub use database::Database;
pub use error::{DbError, DbResult};
pub use operations::chunks::SqliteSink;
pub use operations::queue::QueueCounts;
