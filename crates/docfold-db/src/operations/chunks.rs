//! Chunk persistence and the SQLite-backed sink.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use chrono::Utc;
use docfold_core::{new_id, ChunkRecord, ChunkSink, SinkError};
use rusqlite::params;
use std::collections::BTreeSet;
use tracing::debug;

/// `ChunkSink` that stores chunk records in the local SQLite database.
///
/// Writes are replace-per-file: any previous chunks for the same file are
/// deleted in the same transaction that inserts the new batch, so a
/// reprocessed file never leaves stale chunks behind.
#[derive(Clone)]
pub struct SqliteSink {
    db: Database,
}

impl SqliteSink {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn write_batch(&self, records: &[ChunkRecord]) -> DbResult<()> {
        let mut conn = self.db.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        let file_ids: BTreeSet<&str> =
            records.iter().map(|r| r.file.file_id.as_str()).collect();
        for file_id in &file_ids {
            tx.execute("DELETE FROM chunks WHERE file_id = ?1", params![file_id])?;
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO chunks (id, file_id, chunk_index, content, char_count,
                                     span_start, span_end, filename, file_path, file_type,
                                     file_size, content_hash, mime_type, file_created_at,
                                     file_modified_at, file_owner, inserted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            )?;

            for record in records {
                stmt.execute(params![
                    new_id(),
                    record.file.file_id,
                    record.chunk.chunk_id as i64,
                    record.chunk.text,
                    record.chunk.char_count as i64,
                    serde_json::to_string(&record.chunk.span_start)?,
                    serde_json::to_string(&record.chunk.span_end)?,
                    record.file.filename,
                    record.file.path,
                    record.file.file_type,
                    record.file.size as i64,
                    record.file.content_hash,
                    record.file.mime_type,
                    record.file.created_at.to_rfc3339(),
                    record.file.modified_at.to_rfc3339(),
                    record.file.owner,
                    now,
                ])?;
            }
        }

        tx.commit()?;
        debug!(
            "wrote {} chunk(s) for {} file(s)",
            records.len(),
            file_ids.len()
        );
        Ok(())
    }
}

impl ChunkSink for SqliteSink {
    fn write(&self, records: &[ChunkRecord]) -> Result<(), SinkError> {
        if records.is_empty() {
            return Ok(());
        }
        self.write_batch(records)
            .map_err(|e| SinkError::Storage(e.to_string()))
    }
}

impl Database {
    /// Count stored chunks, optionally for a single file.
    pub fn chunk_count(&self, file_id: Option<&str>) -> DbResult<i64> {
        let conn = self.conn()?;
        let count = match file_id {
            Some(file_id) => conn.query_row(
                "SELECT COUNT(*) FROM chunks WHERE file_id = ?1",
                params![file_id],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// Fetch the stored chunk texts for a file, in chunk order.
    pub fn chunk_texts(&self, file_id: &str) -> DbResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT content FROM chunks WHERE file_id = ?1 ORDER BY chunk_index ASC",
        )?;
        let rows = stmt.query_map(params![file_id], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Delete all stored chunks for a file. Returns the number removed.
    pub fn delete_chunks(&self, file_id: &str) -> DbResult<usize> {
        let conn = self.conn()?;
        let count = conn.execute("DELETE FROM chunks WHERE file_id = ?1", params![file_id])?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use docfold_core::{Chunk, FileMetadata, SourceRef};

    fn sample_record(file_id: &str, chunk_id: usize, text: &str) -> ChunkRecord {
        ChunkRecord {
            chunk: Chunk {
                chunk_id,
                span_start: SourceRef::Line { line: chunk_id },
                span_end: SourceRef::Line { line: chunk_id },
                text: text.to_string(),
                char_count: text.chars().count(),
            },
            file: FileMetadata {
                file_id: file_id.to_string(),
                filename: "report.txt".to_string(),
                path: file_id.to_string(),
                file_type: ".txt".to_string(),
                size: 42,
                content_hash: "deadbeef".to_string(),
                mime_type: "text/plain".to_string(),
                created_at: Utc::now(),
                modified_at: Utc::now(),
                owner: "tester".to_string(),
            },
        }
    }

    #[test]
    fn test_write_and_read_back() {
        let db = Database::open_in_memory().unwrap();
        let sink = SqliteSink::new(db.clone());

        let records = vec![
            sample_record("/data/report.txt", 0, "first chunk"),
            sample_record("/data/report.txt", 1, "second chunk"),
        ];
        sink.write(&records).unwrap();

        assert_eq!(db.chunk_count(Some("/data/report.txt")).unwrap(), 2);
        assert_eq!(
            db.chunk_texts("/data/report.txt").unwrap(),
            vec!["first chunk", "second chunk"]
        );
    }

    #[test]
    fn test_rewrite_replaces_previous_chunks() {
        let db = Database::open_in_memory().unwrap();
        let sink = SqliteSink::new(db.clone());

        sink.write(&[
            sample_record("/data/report.txt", 0, "old a"),
            sample_record("/data/report.txt", 1, "old b"),
            sample_record("/data/report.txt", 2, "old c"),
        ])
        .unwrap();

        sink.write(&[sample_record("/data/report.txt", 0, "new a")])
            .unwrap();

        assert_eq!(db.chunk_count(Some("/data/report.txt")).unwrap(), 1);
        assert_eq!(db.chunk_texts("/data/report.txt").unwrap(), vec!["new a"]);
    }

    #[test]
    fn test_rewrite_leaves_other_files_alone() {
        let db = Database::open_in_memory().unwrap();
        let sink = SqliteSink::new(db.clone());

        sink.write(&[sample_record("/data/a.txt", 0, "aaa")]).unwrap();
        sink.write(&[sample_record("/data/b.txt", 0, "bbb")]).unwrap();

        assert_eq!(db.chunk_count(None).unwrap(), 2);
        assert_eq!(db.chunk_texts("/data/a.txt").unwrap(), vec!["aaa"]);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let db = Database::open_in_memory().unwrap();
        let sink = SqliteSink::new(db.clone());

        sink.write(&[]).unwrap();
        assert_eq!(db.chunk_count(None).unwrap(), 0);
    }

    #[test]
    fn test_delete_chunks() {
        let db = Database::open_in_memory().unwrap();
        let sink = SqliteSink::new(db.clone());

        sink.write(&[sample_record("/data/a.txt", 0, "aaa")]).unwrap();
        assert_eq!(db.delete_chunks("/data/a.txt").unwrap(), 1);
        assert_eq!(db.chunk_count(None).unwrap(), 0);
    }
}
