//! Document extraction: file metadata, format adapters, and the chunker.
//!
//! The extraction pass turns one file on disk into `FileMetadata` plus an
//! ordered sequence of `TextUnit`s; the chunker then folds those units into
//! budget-bounded `Chunk`s. Nothing in this crate touches the database.

pub mod adapters;
pub mod chunker;
mod error;
pub mod metadata;

pub use adapters::{
    adapter_for, is_probably_text, FormatAdapter, SpreadsheetAdapter, TextAdapter, WordAdapter,
};
pub use chunker::{Chunker, ChunkerConfig};
pub use error::{ExtractError, ExtractResult};
pub use metadata::extract_metadata;
