//! Retry command - return failed items to the queue.

use super::{display_name, get_config, get_database};
use anyhow::Result;
use colored::Colorize;
use docfold_core::QueueStatus;
use docfold_db::DbError;

pub fn run(id: Option<String>, all: bool) -> Result<()> {
    let db = get_database()?;
    let config = get_config()?;
    let max_retries = config.queue.max_retries;

    match (id, all) {
        (Some(id), _) => {
            db.retry(&id, max_retries)?;
            println!("{} Item {} returned to the queue", "✓".green(), id);
        }
        (None, true) => {
            let failed = db.list_queue(Some(QueueStatus::Failed))?;
            if failed.is_empty() {
                println!("{}", "No failed items.".dimmed());
                return Ok(());
            }

            let mut retried = 0;
            let mut exhausted = 0;
            for item in failed {
                match db.retry(&item.id, max_retries) {
                    Ok(()) => {
                        println!("  {} {}", "↺".green(), display_name(&item.file_path));
                        retried += 1;
                    }
                    Err(DbError::RetryExhausted { .. }) => {
                        println!(
                            "  {} {} (retry limit reached)",
                            "✗".red(),
                            display_name(&item.file_path)
                        );
                        exhausted += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            println!();
            println!("{} {} item(s) returned to the queue", "✓".green(), retried);
            if exhausted > 0 {
                println!("  {} item(s) out of retries", exhausted);
            }
        }
        (None, false) => {
            anyhow::bail!("Provide an item ID or --all");
        }
    }

    Ok(())
}
