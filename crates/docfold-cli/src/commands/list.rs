//! List command - show queue items.

use super::get_database;
use anyhow::Result;
use colored::Colorize;
use docfold_core::QueueStatus;

pub fn run(status: Option<String>, limit: usize) -> Result<()> {
    let db = get_database()?;

    let filter = match status {
        Some(ref s) => match QueueStatus::from_str(s) {
            Some(status) => Some(status),
            None => anyhow::bail!(
                "Unknown status '{}'. Expected: pending, processing, completed, failed",
                s
            ),
        },
        None => None,
    };

    let items = db.list_queue(filter)?;

    if items.is_empty() {
        println!("{}", "No queue items found.".dimmed());
        return Ok(());
    }

    println!("{}", "Queue Items".cyan().bold());
    println!("{}", "─".repeat(50));

    for item in items.iter().take(limit) {
        let status_label = match item.status {
            QueueStatus::Pending => "pending".yellow(),
            QueueStatus::Processing => "processing".blue(),
            QueueStatus::Completed => "completed".green(),
            QueueStatus::Failed => "failed".red(),
        };

        println!(
            "{} [{}] {}",
            item.id.get(..8).unwrap_or(&item.id).dimmed(),
            status_label,
            item.file_path
        );
        println!(
            "  priority {} · created {} · retries {}",
            item.priority,
            item.created_at.format("%Y-%m-%d %H:%M:%S"),
            item.retry_count
        );
        if let Some(ref err) = item.error_message {
            println!("  {}", err.red().dimmed());
        }
    }

    if items.len() > limit {
        println!();
        println!("{}", format!("...and {} more", items.len() - limit).dimmed());
    }

    Ok(())
}
