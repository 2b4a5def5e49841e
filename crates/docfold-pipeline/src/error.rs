//! Pipeline error types.
//!
//! Only queue-store failures are pipeline errors. Problems with an
//! individual file (extraction, decoding, sink rejection) are recorded on
//! the queue item and never abort the processing loop.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Queue store error: {0}")]
    Db(#[from] docfold_db::DbError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
