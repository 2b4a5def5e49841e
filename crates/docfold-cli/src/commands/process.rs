//! Process command - drain the queue.

use super::{display_name, get_config, get_database, get_paths};
use anyhow::Result;
use colored::Colorize;
use docfold_db::SqliteSink;
use docfold_pipeline::{Coordinator, ItemReport};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};

pub fn run(workers: Option<usize>) -> Result<()> {
    let paths = get_paths()?;
    let config = get_config()?;
    let db = get_database()?;

    let workers = workers.unwrap_or(config.pipeline.workers).max(1);

    let sink = Arc::new(SqliteSink::new(db.clone()));
    let coordinator = Coordinator::new(db.clone(), sink, config);

    // Return items orphaned by a previous crash before claiming
    let reclaimed = coordinator.run_startup_sweep()?;
    if reclaimed > 0 {
        println!("{} Reclaimed {} stale item(s)", "↺".yellow(), reclaimed);
    }

    let pending = db.queue_counts()?.pending;
    if pending == 0 {
        println!("{}", "Queue is empty.".dimmed());
        return Ok(());
    }

    println!(
        "{} {} item(s) with {} worker(s) ({})",
        "Processing".cyan().bold(),
        pending,
        workers,
        paths.database_file.display()
    );

    let bar = ProgressBar::new(pending as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let reports: Mutex<Vec<ItemReport>> = Mutex::new(Vec::new());
    let first_error: Mutex<Option<docfold_pipeline::PipelineError>> = Mutex::new(None);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let coordinator = coordinator.clone();
            let bar = bar.clone();
            let reports = &reports;
            let first_error = &first_error;

            scope.spawn(move || loop {
                match coordinator.process_next() {
                    Ok(Some(report)) => {
                        bar.set_message(display_name(&report.file_path));
                        bar.inc(1);
                        reports.lock().unwrap().push(report);
                    }
                    Ok(None) => break,
                    Err(e) => {
                        first_error.lock().unwrap().get_or_insert(e);
                        break;
                    }
                }
            });
        }
    });

    bar.finish_and_clear();

    if let Some(e) = first_error.into_inner().unwrap() {
        return Err(e.into());
    }

    let reports = reports.into_inner().unwrap();
    let succeeded = reports.iter().filter(|r| r.succeeded()).count();
    let failed = reports.len() - succeeded;

    println!();
    println!("{} {} item(s) completed", "✓".green(), succeeded);
    if failed > 0 {
        println!("{} {} item(s) failed", "✗".red(), failed);
        for report in reports.iter().filter(|r| !r.succeeded()) {
            if let docfold_pipeline::ItemOutcome::Failed { ref message } = report.outcome {
                println!("  {} {}: {}", "✗".red(), display_name(&report.file_path), message);
            }
        }
        println!();
        println!("{}", "Use 'docfold retry --all' to requeue failed items.".dimmed());
    }

    Ok(())
}
