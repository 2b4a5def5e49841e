//! Initialize Docfold.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use docfold_config::Config;
use docfold_db::Database;

pub fn run() -> Result<()> {
    let paths = get_paths()?;

    // Check if already initialized
    if paths.is_initialized() {
        println!("{} Docfold is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        println!("  Database: {}", paths.database_file.display());
        return Ok(());
    }

    println!("{}", "Initializing Docfold...".cyan().bold());

    // Create directories
    paths.ensure_dirs().context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    // Create config file
    Config::create_default_file(&paths.config_file).context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    // Initialize database
    let _db = Database::open(&paths.database_file).context("Failed to initialize database")?;
    println!(
        "  {} Created database: {}",
        "✓".green(),
        paths.database_file.display()
    );

    println!();
    println!("{}", "Docfold initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Queue documents: {}", "docfold enqueue ~/Documents".cyan());
    println!("  2. Process them: {}", "docfold process".cyan());
    println!("  3. Check status: {}", "docfold status".cyan());

    Ok(())
}
