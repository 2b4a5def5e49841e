//! Enqueue command - add files to the processing queue.

use super::get_database;
use anyhow::{Context, Result};
use colored::Colorize;
use docfold_core::FileFormat;
use docfold_db::{Database, DbError};
use std::path::Path;
use walkdir::WalkDir;

pub fn run(path: &str, priority: i32, recursive: bool) -> Result<()> {
    let db = get_database()?;
    let path = Path::new(path);

    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let mut added = 0;
    let mut skipped = 0;
    let mut duplicates = 0;

    if path.is_file() {
        enqueue_one(&db, path, priority, &mut added, &mut skipped, &mut duplicates)?;
    } else {
        let max_depth = if recursive { usize::MAX } else { 1 };
        for entry in WalkDir::new(path)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            enqueue_one(
                &db,
                entry.path(),
                priority,
                &mut added,
                &mut skipped,
                &mut duplicates,
            )?;
        }
    }

    println!();
    println!("{} Added {} item(s) to the queue", "✓".green(), added);
    if duplicates > 0 {
        println!("  {} already queued", duplicates.to_string().yellow());
    }
    if skipped > 0 {
        println!("  {} unsupported file(s) skipped", skipped);
    }

    Ok(())
}

fn enqueue_one(
    db: &Database,
    path: &Path,
    priority: i32,
    added: &mut usize,
    skipped: &mut usize,
    duplicates: &mut usize,
) -> Result<()> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();

    if FileFormat::from_extension(&ext).is_none() {
        *skipped += 1;
        return Ok(());
    }

    let abs = std::fs::canonicalize(path)
        .with_context(|| format!("Failed to resolve path: {}", path.display()))?;
    let path_str = abs.to_string_lossy();

    match db.enqueue(&path_str, priority) {
        Ok(item) => {
            println!("  {} {} ({})", "+".green(), path_str, item.id);
            *added += 1;
            Ok(())
        }
        Err(DbError::Duplicate(_)) => {
            println!("  {} {} (already queued)", "•".dimmed(), path_str);
            *duplicates += 1;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
