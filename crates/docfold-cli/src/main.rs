//! Docfold CLI - Document ingestion and chunking pipeline

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Docfold - Document ingestion and chunking pipeline
#[derive(Parser)]
#[command(name = "docfold")]
#[command(version)]
#[command(about = "Queue, extract, and chunk documents into a local store", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Docfold (create config and database)
    Init,

    /// Add files to the processing queue
    Enqueue {
        /// Path to a file or directory
        path: String,

        /// Priority (higher is claimed sooner)
        #[arg(short, long, default_value = "0")]
        priority: i32,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Show queue status
    Status,

    /// List queue items
    List {
        /// Filter by status (pending, processing, completed, failed)
        #[arg(short, long)]
        status: Option<String>,

        /// Maximum number of items to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Process queued items
    Process {
        /// Number of worker threads (default: from config)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Return failed items to the queue
    Retry {
        /// Item ID to retry
        id: Option<String>,

        /// Retry all failed items
        #[arg(long)]
        all: bool,
    },

    /// Remove terminal items from the queue
    Clear {
        /// Remove completed items
        #[arg(long)]
        completed: bool,

        /// Remove failed items
        #[arg(long)]
        failed: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docfold=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docfold=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Enqueue {
            path,
            priority,
            recursive,
        } => commands::enqueue::run(&path, priority, recursive),
        Commands::Status => commands::status::run(),
        Commands::List { status, limit } => commands::list::run(status, limit),
        Commands::Process { workers } => commands::process::run(workers),
        Commands::Retry { id, all } => commands::retry::run(id, all),
        Commands::Clear { completed, failed } => commands::clear::run(completed, failed),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
