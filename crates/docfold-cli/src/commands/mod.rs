//! CLI command implementations.

pub mod clear;
pub mod enqueue;
pub mod init;
pub mod list;
pub mod process;
pub mod retry;
pub mod status;

use anyhow::{Context, Result};
use docfold_config::{AppPaths, Config};
use docfold_db::Database;

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Get a database connection, ensuring docfold is initialized.
///
/// `[general] data_dir` in the config relocates the database file.
pub fn get_database() -> Result<Database> {
    let paths = get_paths()?;

    if !paths.config_file.exists() {
        anyhow::bail!("Docfold is not initialized. Run 'docfold init' first.");
    }

    let config = get_config()?;
    let db_path = config
        .general
        .data_dir
        .as_ref()
        .map(|dir| std::path::Path::new(dir).join("docfold.db"))
        .unwrap_or_else(|| paths.database_file.clone());

    Database::open(&db_path).context("Failed to open database")
}

/// Load configuration from the default location.
pub fn get_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

/// Shorten a path to its file name for display.
pub fn display_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}
