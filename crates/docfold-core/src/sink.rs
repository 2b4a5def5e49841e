//! Sink boundary for persisted chunk records.

use crate::types::ChunkRecord;
use thiserror::Error;

/// Errors reported by a chunk sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink rejected batch: {0}")]
    Rejected(String),

    #[error("sink storage error: {0}")]
    Storage(String),
}

/// Destination for extracted chunk batches.
///
/// The pipeline hands every file's chunks to a sink in one `write` call;
/// vectorization and indexing happen behind this boundary.
pub trait ChunkSink: Send + Sync {
    fn write(&self, records: &[ChunkRecord]) -> Result<(), SinkError>;
}
