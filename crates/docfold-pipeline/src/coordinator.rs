//! The pipeline coordinator.
//!
//! Runs the per-item flow: claim the next queue item, extract metadata and
//! text units, fold units into chunks, hand the batch to the sink, then
//! mark the item completed. Any per-file problem fails the item with its
//! message and the loop moves on.

use crate::error::PipelineResult;
use chrono::Duration;
use docfold_config::Config;
use docfold_core::{ChunkRecord, ChunkSink, FileFormat, QueueItem, SinkError};
use docfold_db::Database;
use docfold_extract::{
    adapter_for, extract_metadata, Chunker, ChunkerConfig, ExtractError, SpreadsheetAdapter,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to one processed queue item.
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    Completed {
        format: FileFormat,
        units: usize,
        chunks: usize,
    },
    Failed {
        message: String,
    },
}

/// Report for one claimed item, returned whether it succeeded or not.
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub item_id: String,
    pub file_path: String,
    pub outcome: ItemOutcome,
}

impl ItemReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Completed { .. })
    }
}

/// Per-file stage failure; becomes the item's error message.
#[derive(Debug)]
enum StageError {
    Extract(ExtractError),
    Sink(SinkError),
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageError::Extract(e) => write!(f, "{}", e),
            StageError::Sink(e) => write!(f, "{}", e),
        }
    }
}

impl From<ExtractError> for StageError {
    fn from(e: ExtractError) -> Self {
        StageError::Extract(e)
    }
}

impl From<SinkError> for StageError {
    fn from(e: SinkError) -> Self {
        StageError::Sink(e)
    }
}

/// Drives queue items through extraction, chunking, and persistence.
#[derive(Clone)]
pub struct Coordinator {
    db: Database,
    sink: Arc<dyn ChunkSink>,
    config: Config,
}

impl Coordinator {
    pub fn new(db: Database, sink: Arc<dyn ChunkSink>, config: Config) -> Self {
        Self { db, sink, config }
    }

    /// Return orphaned PROCESSING items to PENDING.
    ///
    /// Call once at startup, before any worker claims.
    pub fn run_startup_sweep(&self) -> PipelineResult<usize> {
        let threshold = Duration::seconds(self.config.queue.stale_after_seconds as i64);
        Ok(self.db.reclaim_stale(threshold)?)
    }

    /// Claim and process one item.
    ///
    /// `Ok(None)` means the queue had nothing to claim. A report is
    /// returned for failed items too; only queue-store errors bubble up.
    pub fn process_next(&self) -> PipelineResult<Option<ItemReport>> {
        let Some(item) = self.db.claim_next()? else {
            return Ok(None);
        };

        debug!("processing {} ({})", item.file_path, item.id);

        let report = match self.run_stages(&item) {
            Ok((format, units, chunks)) => {
                self.db.complete(&item.id)?;
                info!(
                    "completed {}: {} unit(s) -> {} chunk(s)",
                    item.file_path, units, chunks
                );
                ItemReport {
                    item_id: item.id,
                    file_path: item.file_path,
                    outcome: ItemOutcome::Completed {
                        format,
                        units,
                        chunks,
                    },
                }
            }
            Err(stage_err) => {
                let message = stage_err.to_string();
                warn!("failed {}: {}", item.file_path, message);
                self.db.fail(&item.id, &message)?;
                ItemReport {
                    item_id: item.id,
                    file_path: item.file_path,
                    outcome: ItemOutcome::Failed { message },
                }
            }
        };

        Ok(Some(report))
    }

    /// Process items until the queue drains.
    pub fn process_all(&self) -> PipelineResult<Vec<ItemReport>> {
        let mut reports = Vec::new();
        while let Some(report) = self.process_next()? {
            reports.push(report);
        }
        Ok(reports)
    }

    /// Drain the queue with `n` OS threads, each looping `process_next`.
    pub fn run_workers(&self, n: usize) -> PipelineResult<Vec<ItemReport>> {
        let n = n.max(1);
        if n == 1 {
            return self.process_all();
        }

        let mut results: Vec<PipelineResult<Vec<ItemReport>>> = Vec::new();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..n)
                .map(|worker| {
                    let coordinator = self.clone();
                    scope.spawn(move || {
                        debug!("worker {} started", worker);
                        coordinator.process_all()
                    })
                })
                .collect();

            for handle in handles {
                // Worker closures do not panic; stage failures are reports
                if let Ok(result) = handle.join() {
                    results.push(result);
                }
            }
        });

        let mut reports = Vec::new();
        for result in results {
            reports.extend(result?);
        }
        Ok(reports)
    }

    /// Extract, chunk, and persist one file.
    fn run_stages(&self, item: &QueueItem) -> Result<(FileFormat, usize, usize), StageError> {
        let path = Path::new(&item.file_path);

        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        let format = FileFormat::from_extension(&ext)
            .ok_or_else(|| ExtractError::UnsupportedFormat(ext.clone()))?;

        let file_meta = extract_metadata(path)?;

        // Best effort: the item still completes if the info can't be stored
        let mut meta_json = serde_json::json!({
            "filename": file_meta.filename,
            "mime_type": file_meta.mime_type,
            "size": file_meta.size,
            "format": format.as_str(),
        });
        if format == FileFormat::Spreadsheet {
            if let Ok(summary) = SpreadsheetAdapter::workbook_summary(path) {
                meta_json["sheets"] = summary
                    .into_iter()
                    .map(|(name, rows)| serde_json::json!({ "name": name, "rows": rows }))
                    .collect::<Vec<_>>()
                    .into();
            }
        }
        if let Err(e) = self
            .db
            .attach_file_info(&item.id, &file_meta.content_hash, &meta_json)
        {
            warn!("could not attach file info to {}: {}", item.id, e);
        }

        let adapter = adapter_for(format, &self.config.extract.encodings);
        let units = adapter.produce_units(path)?;

        let chunker = Chunker::new(ChunkerConfig {
            budget: self.config.chunking.budget_chars,
        });
        let chunks = chunker.fold(&units);

        let records: Vec<ChunkRecord> = chunks
            .into_iter()
            .map(|chunk| ChunkRecord {
                chunk,
                file: file_meta.clone(),
            })
            .collect();

        self.sink.write(&records)?;

        Ok((format, units.len(), records.len()))
    }
}
