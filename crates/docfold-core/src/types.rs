//! Core domain types for Docfold.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for queue items.
pub type QueueItemId = String;

/// Unique identifier for files (absolute path).
pub type FileId = String;

/// Generate a new unique ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Text,
    Spreadsheet,
    Word,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Text => "text",
            FileFormat::Spreadsheet => "spreadsheet",
            FileFormat::Word => "word",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(FileFormat::Text),
            "spreadsheet" => Some(FileFormat::Spreadsheet),
            "word" => Some(FileFormat::Word),
            _ => None,
        }
    }

    /// Detect document format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            // Spreadsheet formats
            "xlsx" | "xls" | "xlsm" => Some(FileFormat::Spreadsheet),
            // Word-processor formats
            "docx" | "doc" => Some(FileFormat::Word),
            // Plain text and text-like formats
            "txt" | "md" | "markdown" | "rst" | "log" | "text"
            | "py" | "js" | "ts" | "jsx" | "tsx" | "java" | "c" | "cpp" | "h" | "hpp"
            | "cs" | "go" | "rs" | "rb" | "php" | "swift" | "kt" | "scala"
            | "html" | "htm" | "xml" | "css" | "scss" | "sass" | "less"
            | "sh" | "bash" | "zsh" | "fish" | "ps1" | "bat" | "cmd"
            | "sql" | "r" | "pl" | "pm" | "lua" | "vim"
            | "yaml" | "yml" | "toml" | "ini" | "cfg" | "conf" | "config"
            | "json" | "jsonl" | "csv" | "tsv"
            | "env" | "gitignore" | "gitattributes"
            | "tex" | "bib" | "org" => Some(FileFormat::Text),
            _ => None,
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Position of a text unit in its source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRef {
    /// Zero-based line index in a text file.
    Line { line: usize },
    /// Sheet name and zero-based row index in a spreadsheet.
    Row { sheet: String, row: usize },
    /// Zero-based paragraph index in a word document.
    Paragraph { paragraph: usize },
    /// Table index and row index in a word document.
    TableRow { table: usize, row: usize },
}

impl std::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceRef::Line { line } => write!(f, "line {}", line),
            SourceRef::Row { sheet, row } => write!(f, "{}:row {}", sheet, row),
            SourceRef::Paragraph { paragraph } => write!(f, "paragraph {}", paragraph),
            SourceRef::TableRow { table, row } => write!(f, "table {} row {}", table, row),
        }
    }
}

/// One line/row/paragraph-equivalent element produced by a format adapter.
///
/// The common currency between extraction and chunking; held only in memory
/// during one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    /// Ordinal position in the emitted sequence.
    pub index: usize,
    pub text: String,
    pub source_ref: SourceRef,
}

impl TextUnit {
    pub fn new(index: usize, text: impl Into<String>, source_ref: SourceRef) -> Self {
        Self {
            index,
            text: text.into(),
            source_ref,
        }
    }
}

/// A bounded-size piece of extracted text with source provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Zero-based emission order within the file.
    pub chunk_id: usize,
    /// Source position of the first unit folded in.
    pub span_start: SourceRef,
    /// Source position of the last unit folded in.
    pub span_end: SourceRef,
    pub text: String,
    /// Length of `text` in characters.
    pub char_count: usize,
}

/// File-level identity and integrity attributes, computed once per
/// extraction pass and attached to every chunk before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub file_id: FileId,
    pub filename: String,
    pub path: String,
    /// Lowercased file extension including the leading dot.
    pub file_type: String,
    pub size: u64,
    pub content_hash: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub owner: String,
}

/// A chunk paired with the metadata of the file it came from; the batch
/// element handed to the sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub chunk: Chunk,
    pub file: FileMetadata,
}

/// Status of a queue item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Processing => "processing",
            QueueStatus::Completed => "completed",
            QueueStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(QueueStatus::Pending),
            "processing" => Some(QueueStatus::Processing),
            "completed" => Some(QueueStatus::Completed),
            "failed" => Some(QueueStatus::Failed),
            _ => None,
        }
    }

    /// Terminal states may be re-enqueued as fresh rows; non-terminal
    /// states hold the uniqueness lock on their file path.
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueueStatus::Completed | QueueStatus::Failed)
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file-processing request in the durable work queue.
///
/// Owned exclusively by the queue store; mutated only through its
/// transition operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: QueueItemId,
    pub file_path: String,
    pub status: QueueStatus,
    /// Higher priority is claimed sooner.
    pub priority: i32,
    pub retry_count: i32,
    pub error_message: Option<String>,
    pub file_hash: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl QueueItem {
    pub fn new(file_path: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            file_path: file_path.into(),
            status: QueueStatus::Pending,
            priority: 0,
            retry_count: 0,
            error_message: None,
            file_hash: None,
            metadata: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_extension("txt"), Some(FileFormat::Text));
        assert_eq!(FileFormat::from_extension("XLSX"), Some(FileFormat::Spreadsheet));
        assert_eq!(FileFormat::from_extension("docx"), Some(FileFormat::Word));
        assert_eq!(FileFormat::from_extension("rs"), Some(FileFormat::Text));
        assert_eq!(FileFormat::from_extension("exe"), None);
    }

    #[test]
    fn test_queue_item_creation() {
        let item = QueueItem::new("/path/to/report.txt").with_priority(5);

        assert_eq!(item.file_path, "/path/to/report.txt");
        assert_eq!(item.status, QueueStatus::Pending);
        assert_eq!(item.priority, 5);
        assert_eq!(item.retry_count, 0);
        assert!(item.started_at.is_none());
        assert!(!item.id.is_empty());
    }

    #[test]
    fn test_status_terminality() {
        assert!(!QueueStatus::Pending.is_terminal());
        assert!(!QueueStatus::Processing.is_terminal());
        assert!(QueueStatus::Completed.is_terminal());
        assert!(QueueStatus::Failed.is_terminal());
    }

    #[test]
    fn test_source_ref_serialization() {
        let r = SourceRef::Row {
            sheet: "Sheet1".to_string(),
            row: 3,
        };
        let json = serde_json::to_string(&r).unwrap();
        let back: SourceRef = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
