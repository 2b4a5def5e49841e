//! Docfold Core - shared domain types for the document processing pipeline.

mod sink;
mod types;

pub use sink::{ChunkSink, SinkError};
pub use types::*;
