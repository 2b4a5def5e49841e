//! Processing queue operations.
//!
//! The queue is a state machine: PENDING -> PROCESSING -> {COMPLETED |
//! FAILED}, with FAILED -> PENDING allowed through `retry` while the retry
//! budget lasts. Every transition is a single conditional UPDATE so that
//! concurrent workers can never move the same row twice.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use chrono::{DateTime, Duration, Utc};
use docfold_core::{new_id, QueueItem, QueueStatus};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

const QUEUE_COLUMNS: &str = "id, file_path, status, priority, retry_count, error_message, \
     file_hash, metadata, created_at, updated_at, started_at, completed_at";

/// Per-status row counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueCounts {
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
}

impl Database {
    /// Insert a new PENDING item for `file_path`.
    ///
    /// Rejected with `Duplicate` when the path already has a PENDING or
    /// PROCESSING row; completed/failed paths may be re-enqueued and get a
    /// fresh row. The guard and the insert are one statement, so two
    /// concurrent enqueues of the same path cannot both succeed.
    pub fn enqueue(&self, file_path: &str, priority: i32) -> DbResult<QueueItem> {
        let conn = self.conn()?;
        let id = new_id();
        let now = Utc::now();

        // RETURNING keeps this on one connection; a follow-up read would
        // starve a single-connection pool
        let item = conn
            .query_row(
                &format!(
                    "INSERT INTO queue (id, file_path, status, priority, retry_count, error_message,
                                        file_hash, metadata, created_at, updated_at, started_at, completed_at)
                     SELECT ?1, ?2, 'pending', ?3, 0, NULL, NULL, NULL, ?4, ?4, NULL, NULL
                     WHERE NOT EXISTS (
                         SELECT 1 FROM queue
                         WHERE file_path = ?2 AND status IN ('pending', 'processing')
                     )
                     RETURNING {QUEUE_COLUMNS}"
                ),
                params![id, file_path, priority, now.to_rfc3339()],
                row_to_queue_item,
            )
            .optional()?;

        match item {
            Some(item) => {
                debug!(file_path, priority, "enqueued item {}", item.id);
                Ok(item)
            }
            None => Err(DbError::Duplicate(file_path.to_string())),
        }
    }

    /// Get a queue item by ID.
    pub fn get_queue_item(&self, id: &str) -> DbResult<QueueItem> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {QUEUE_COLUMNS} FROM queue WHERE id = ?1"),
            params![id],
            row_to_queue_item,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                DbError::NotFound(format!("Queue item not found: {}", id))
            }
            _ => DbError::from(e),
        })
    }

    /// Atomically claim the next PENDING item for processing.
    ///
    /// Selects the highest-priority, oldest-created pending row and flips
    /// it to PROCESSING in one UPDATE, so at most one caller gets any given
    /// item. Returns `None` when the queue has nothing to claim.
    pub fn claim_next(&self) -> DbResult<Option<QueueItem>> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let item = conn
            .query_row(
                &format!(
                    "UPDATE queue
                     SET status = 'processing', started_at = ?1, updated_at = ?1
                     WHERE id = (
                         SELECT id FROM queue
                         WHERE status = 'pending'
                         ORDER BY priority DESC, created_at ASC, rowid ASC
                         LIMIT 1
                     ) AND status = 'pending'
                     RETURNING {QUEUE_COLUMNS}"
                ),
                params![now],
                row_to_queue_item,
            )
            .optional()?;

        if let Some(ref item) = item {
            debug!("claimed item {} ({})", item.id, item.file_path);
        }

        Ok(item)
    }

    /// PROCESSING -> COMPLETED, stamping `completed_at`.
    pub fn complete(&self, id: &str) -> DbResult<()> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let rows = conn.execute(
            "UPDATE queue SET status = 'completed', completed_at = ?2, updated_at = ?2
             WHERE id = ?1 AND status = 'processing'",
            params![id, now],
        )?;

        if rows == 0 {
            return Err(self.transition_error(&conn, id, "completed"));
        }

        Ok(())
    }

    /// PROCESSING -> FAILED, recording the message and incrementing
    /// `retry_count`.
    pub fn fail(&self, id: &str, error_message: &str) -> DbResult<()> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let rows = conn.execute(
            "UPDATE queue SET status = 'failed', error_message = ?2,
                              retry_count = retry_count + 1, updated_at = ?3
             WHERE id = ?1 AND status = 'processing'",
            params![id, error_message, now],
        )?;

        if rows == 0 {
            return Err(self.transition_error(&conn, id, "failed"));
        }

        Ok(())
    }

    /// FAILED -> PENDING, clearing the error and run timestamps.
    ///
    /// Items at or past `max_retries` stay FAILED terminally; moving them
    /// again requires an explicit re-enqueue.
    pub fn retry(&self, id: &str, max_retries: i32) -> DbResult<()> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let rows = conn.execute(
            "UPDATE queue SET status = 'pending', error_message = NULL,
                              started_at = NULL, completed_at = NULL, updated_at = ?2
             WHERE id = ?1 AND status = 'failed' AND retry_count < ?3",
            params![id, now, max_retries],
        )?;

        if rows == 0 {
            // Diagnose on the same connection
            let row: Option<(String, i32)> = conn
                .query_row(
                    "SELECT status, retry_count FROM queue WHERE id = ?1",
                    params![id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            return match row {
                None => Err(DbError::NotFound(format!("Queue item not found: {}", id))),
                Some((status, retry_count)) if status == QueueStatus::Failed.as_str() => {
                    Err(DbError::RetryExhausted {
                        id: id.to_string(),
                        retry_count,
                    })
                }
                Some((status, _)) => Err(DbError::InvalidTransition {
                    id: id.to_string(),
                    status,
                    requested: "pending",
                }),
            };
        }

        Ok(())
    }

    /// Record the file hash and extraction metadata on an in-flight item.
    /// Valid only while the item is PROCESSING.
    pub fn attach_file_info(
        &self,
        id: &str,
        file_hash: &str,
        metadata: &serde_json::Value,
    ) -> DbResult<()> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let rows = conn.execute(
            "UPDATE queue SET file_hash = ?2, metadata = ?3, updated_at = ?4
             WHERE id = ?1 AND status = 'processing'",
            params![id, file_hash, serde_json::to_string(metadata)?, now],
        )?;

        if rows == 0 {
            return Err(self.transition_error(&conn, id, "attach_file_info"));
        }

        Ok(())
    }

    /// Return orphaned PROCESSING items to PENDING.
    ///
    /// Run once at startup: any item claimed longer ago than `stale_after`
    /// belonged to a worker that no longer exists.
    pub fn reclaim_stale(&self, stale_after: Duration) -> DbResult<usize> {
        let conn = self.conn()?;
        let now = Utc::now();
        let cutoff = now - stale_after;

        let rows = conn.execute(
            "UPDATE queue SET status = 'pending', started_at = NULL, updated_at = ?1
             WHERE status = 'processing' AND started_at IS NOT NULL AND started_at < ?2",
            params![now.to_rfc3339(), cutoff.to_rfc3339()],
        )?;

        if rows > 0 {
            info!("reclaimed {} stale processing item(s)", rows);
        }

        Ok(rows)
    }

    /// Read-only snapshot of the queue, optionally filtered by status,
    /// ordered by (priority desc, created_at asc).
    pub fn list_queue(&self, status: Option<QueueStatus>) -> DbResult<Vec<QueueItem>> {
        let conn = self.conn()?;

        let items = match status {
            Some(s) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {QUEUE_COLUMNS} FROM queue WHERE status = ?1
                     ORDER BY priority DESC, created_at ASC, rowid ASC"
                ))?;
                let rows = stmt.query_map(params![s.as_str()], row_to_queue_item)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {QUEUE_COLUMNS} FROM queue
                     ORDER BY priority DESC, created_at ASC, rowid ASC"
                ))?;
                let rows = stmt.query_map([], row_to_queue_item)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(items)
    }

    /// Get queue counts by status.
    pub fn queue_counts(&self) -> DbResult<QueueCounts> {
        let conn = self.conn()?;
        let mut counts = QueueCounts::default();

        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM queue GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (status, count) = row?;
            match QueueStatus::from_str(&status) {
                Some(QueueStatus::Pending) => counts.pending = count,
                Some(QueueStatus::Processing) => counts.processing = count,
                Some(QueueStatus::Completed) => counts.completed = count,
                Some(QueueStatus::Failed) => counts.failed = count,
                None => {}
            }
        }

        Ok(counts)
    }

    /// Delete completed items from the queue.
    pub fn clear_completed(&self) -> DbResult<usize> {
        let conn = self.conn()?;
        let count = conn.execute("DELETE FROM queue WHERE status = 'completed'", [])?;
        Ok(count)
    }

    /// Delete failed items from the queue.
    pub fn clear_failed(&self) -> DbResult<usize> {
        let conn = self.conn()?;
        let count = conn.execute("DELETE FROM queue WHERE status = 'failed'", [])?;
        Ok(count)
    }

    /// Build the error for a conditional update that matched no row:
    /// either the id does not exist or the item is in the wrong state.
    fn transition_error(
        &self,
        conn: &rusqlite::Connection,
        id: &str,
        requested: &'static str,
    ) -> DbError {
        let status: Option<String> = conn
            .query_row(
                "SELECT status FROM queue WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .unwrap_or(None);

        match status {
            Some(status) => DbError::InvalidTransition {
                id: id.to_string(),
                status,
                requested,
            },
            None => DbError::NotFound(format!("Queue item not found: {}", id)),
        }
    }
}

fn row_to_queue_item(row: &rusqlite::Row) -> rusqlite::Result<QueueItem> {
    let status_str: String = row.get(2)?;
    let metadata_str: Option<String> = row.get(7)?;
    let created_at_str: String = row.get(8)?;
    let updated_at_str: String = row.get(9)?;
    let started_at_str: Option<String> = row.get(10)?;
    let completed_at_str: Option<String> = row.get(11)?;

    Ok(QueueItem {
        id: row.get(0)?,
        file_path: row.get(1)?,
        status: QueueStatus::from_str(&status_str).unwrap_or(QueueStatus::Pending),
        priority: row.get(3)?,
        retry_count: row.get(4)?,
        error_message: row.get(5)?,
        file_hash: row.get(6)?,
        metadata: metadata_str.and_then(|s| serde_json::from_str(&s).ok()),
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
        started_at: started_at_str.as_deref().map(parse_timestamp),
        completed_at: completed_at_str.as_deref().map(parse_timestamp),
    })
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
