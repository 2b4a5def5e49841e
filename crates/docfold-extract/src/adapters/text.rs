//! Plain-text adapter with trial-decode encoding detection.

use crate::adapters::FormatAdapter;
use crate::error::{ExtractError, ExtractResult};
use docfold_core::{FileFormat, SourceRef, TextUnit};
use std::path::Path;
use tracing::debug;

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "log", "text", "csv", "tsv", "json", "jsonl", "yaml", "yml",
    "toml", "ini", "cfg", "conf", "xml", "html", "htm",
];

/// Default trial order: strict UTF-8 first, common regional 8-bit
/// encodings next, then a permissive single-byte fallback.
pub const DEFAULT_ENCODINGS: &[&str] = &["utf-8", "shift_jis", "euc-jp", "windows-1252"];

/// Adapter for plain text and text-like files; one unit per source line,
/// blank lines included.
pub struct TextAdapter {
    encodings: Vec<String>,
}

impl TextAdapter {
    pub fn new(encodings: Vec<String>) -> Self {
        let encodings = if encodings.is_empty() {
            DEFAULT_ENCODINGS.iter().map(|s| s.to_string()).collect()
        } else {
            encodings
        };
        Self { encodings }
    }

    /// Decode raw bytes by trying each candidate encoding in order.
    fn decode(&self, path: &Path, bytes: &[u8]) -> ExtractResult<String> {
        for label in &self.encodings {
            let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) else {
                debug!("unknown encoding label '{}', skipping", label);
                continue;
            };
            let (decoded, _, had_errors) = encoding.decode(bytes);
            if !had_errors {
                debug!("decoded {} as {}", path.display(), encoding.name());
                return Ok(decoded.into_owned());
            }
        }

        Err(ExtractError::Encoding {
            path: path.to_path_buf(),
            tried: self.encodings.join(", "),
        })
    }
}

impl Default for TextAdapter {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FormatAdapter for TextAdapter {
    fn produce_units(&self, path: &Path) -> ExtractResult<Vec<TextUnit>> {
        if !path.exists() {
            return Err(ExtractError::NotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path)?;
        let content = self.decode(path, &bytes)?;

        let units = content
            .lines()
            .enumerate()
            .map(|(line_no, line)| TextUnit::new(line_no, line, SourceRef::Line { line: line_no }))
            .collect();

        Ok(units)
    }

    fn extensions(&self) -> &[&str] {
        TEXT_EXTENSIONS
    }
}

/// Whether the extension names a text-like format we can extract.
pub fn is_probably_text(extension: &str) -> bool {
    FileFormat::from_extension(extension) == Some(FileFormat::Text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_unit_per_line_including_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "alpha\n\nbeta\n").unwrap();

        let units = TextAdapter::default().produce_units(&path).unwrap();
        assert_eq!(units.len(), 3);
        assert_eq!(units[0].text, "alpha");
        assert_eq!(units[0].source_ref, SourceRef::Line { line: 0 });
        assert_eq!(units[1].text, "");
        assert_eq!(units[1].source_ref, SourceRef::Line { line: 1 });
        assert_eq!(units[2].text, "beta");
        assert_eq!(units[2].source_ref, SourceRef::Line { line: 2 });
    }

    #[test]
    fn test_shift_jis_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sjis.txt");
        // "日本語" in Shift_JIS; invalid as UTF-8
        std::fs::write(&path, [0x93, 0xfa, 0x96, 0x7b, 0x8c, 0xea]).unwrap();

        let units = TextAdapter::default().produce_units(&path).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "日本語");
    }

    #[test]
    fn test_undecodable_bytes_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let adapter = TextAdapter::new(vec!["utf-8".to_string()]);
        let err = adapter.produce_units(&path).unwrap_err();
        assert!(matches!(err, ExtractError::Encoding { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = TextAdapter::default()
            .produce_units(Path::new("/no/such/notes.txt"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::NotFound(_)));
    }

    #[test]
    fn test_is_probably_text() {
        assert!(is_probably_text("md"));
        assert!(is_probably_text("rs"));
        assert!(!is_probably_text("xlsx"));
        assert!(!is_probably_text("exe"));
    }
}
