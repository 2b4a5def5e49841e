//! Clear command - remove terminal items from the queue.

use super::get_database;
use anyhow::Result;
use colored::Colorize;

pub fn run(completed: bool, failed: bool) -> Result<()> {
    let db = get_database()?;

    // With no flag, clear only completed items
    let clear_completed = completed || !failed;

    let mut removed = 0;
    if clear_completed {
        let n = db.clear_completed()?;
        println!("{} Removed {} completed item(s)", "✓".green(), n);
        removed += n;
    }
    if failed {
        let n = db.clear_failed()?;
        println!("{} Removed {} failed item(s)", "✓".green(), n);
        removed += n;
    }

    if removed == 0 {
        println!("{}", "Nothing to clear.".dimmed());
    }

    Ok(())
}
