//! Status command - show queue status.

use super::{display_name, get_database};
use anyhow::Result;
use colored::Colorize;
use docfold_core::QueueStatus;

pub fn run() -> Result<()> {
    let db = get_database()?;

    println!("{}", "Docfold Status".cyan().bold());
    println!("{}", "─".repeat(50));

    let counts = db.queue_counts()?;

    println!();
    println!("{}", "Processing Queue".white().bold());
    println!("  {} Pending: {}", "○".yellow(), counts.pending);
    println!("  {} Processing: {}", "◐".blue(), counts.processing);
    println!("  {} Completed: {}", "●".green(), counts.completed);
    if counts.failed > 0 {
        println!("  {} Failed: {}", "✗".red(), counts.failed);
    }

    // Show pending items
    let pending_items = db.list_queue(Some(QueueStatus::Pending))?;
    if !pending_items.is_empty() {
        println!();
        println!("{}", "Pending Items".white().bold());
        for item in pending_items.iter().take(5) {
            println!(
                "  {} {} (priority {})",
                "•".dimmed(),
                display_name(&item.file_path),
                item.priority
            );
        }
        if pending_items.len() > 5 {
            println!("  {} ...and {} more", "".dimmed(), pending_items.len() - 5);
        }
    }

    // Show failed items with their errors
    let failed_items = db.list_queue(Some(QueueStatus::Failed))?;
    if !failed_items.is_empty() {
        println!();
        println!("{}", "Failed Items".red().bold());
        for item in failed_items.iter().take(3) {
            println!(
                "  {} {} (attempt {})",
                "✗".red(),
                display_name(&item.file_path),
                item.retry_count
            );
            if let Some(ref err) = item.error_message {
                println!("    {}", err.dimmed());
            }
        }
        if failed_items.len() > 3 {
            println!("  {} ...and {} more", "".dimmed(), failed_items.len() - 3);
        }
    }

    if counts.pending == 0 && counts.processing == 0 {
        println!();
        println!(
            "{}",
            "No items waiting. Use 'docfold enqueue <path>' to add documents.".dimmed()
        );
    }

    Ok(())
}
