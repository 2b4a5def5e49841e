//! Pipeline coordination: claim, extract, chunk, persist, finalize.

mod coordinator;
mod error;

pub use coordinator::{Coordinator, ItemOutcome, ItemReport};
pub use error::{PipelineError, PipelineResult};
