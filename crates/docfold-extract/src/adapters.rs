//! Format adapters.
//!
//! Each adapter turns one file format into an ordered sequence of
//! `TextUnit`s. Adapters are read-only and all-or-nothing: a parse failure
//! emits no units at all.

mod spreadsheet;
mod text;
mod word;

pub use spreadsheet::SpreadsheetAdapter;
pub use text::{is_probably_text, TextAdapter, DEFAULT_ENCODINGS};
pub use word::WordAdapter;

use crate::error::ExtractResult;
use docfold_core::{FileFormat, TextUnit};
use std::path::Path;

/// A format-specific extractor producing position-annotated text units.
pub trait FormatAdapter: Send + Sync {
    /// Extract every text unit from the file, in document order.
    fn produce_units(&self, path: &Path) -> ExtractResult<Vec<TextUnit>>;

    /// File extensions (lowercase, without dot) this adapter handles.
    fn extensions(&self) -> &[&str];

    fn supports(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions().contains(&ext.as_str())
    }
}

/// Build the adapter for a detected format.
///
/// `encodings` is the trial-decode candidate list for text files; the
/// binary formats ignore it.
pub fn adapter_for(format: FileFormat, encodings: &[String]) -> Box<dyn FormatAdapter> {
    match format {
        FileFormat::Text => Box::new(TextAdapter::new(encodings.to_vec())),
        FileFormat::Spreadsheet => Box::new(SpreadsheetAdapter::new()),
        FileFormat::Word => Box::new(WordAdapter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_lookup_by_format() {
        let encodings = vec!["utf-8".to_string()];

        assert!(adapter_for(FileFormat::Text, &encodings).supports("txt"));
        assert!(adapter_for(FileFormat::Spreadsheet, &encodings).supports("XLSX"));
        assert!(adapter_for(FileFormat::Word, &encodings).supports("docx"));
        assert!(!adapter_for(FileFormat::Word, &encodings).supports("xlsx"));
    }
}
