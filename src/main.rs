//! Taskboard backend server.
//!
//! A task-tracking HTTP backend where every mutation is mirrored into an
//! append-only history log.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::sync::Arc;
use taskboard::config::Config;
use taskboard::db::Database;
use taskboard::web;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Taskboard backend server and CLI tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    database: Option<String>,

    /// Port for the HTTP server (overrides config)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Directory served under /static (overrides config)
    #[arg(long, global = true)]
    static_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    log: String,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default if no subcommand given)
    Serve,

    /// Wipe all tasks and history
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };

    // Override from CLI arguments
    if let Some(db_path) = &cli.database {
        config.server.db_path = db_path.into();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(static_dir) = &cli.static_dir {
        config.server.static_dir = static_dir.into();
    }

    match cli.command {
        Some(Command::Reset) => run_reset(&config),
        Some(Command::Serve) | None => run_server(config).await,
    }
}

/// Run the HTTP server.
async fn run_server(config: Config) -> Result<()> {
    config.ensure_db_dir()?;

    info!("Starting taskboard v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {:?}", config.server.db_path);
    info!("Static dir: {:?}", config.server.static_dir);

    let db = Arc::new(Database::open(&config.server.db_path)?);
    info!("Database initialized successfully");

    web::serve(db, config.server.port, config.server.static_dir.clone()).await
}

/// Run the reset command: wipe both tables.
fn run_reset(config: &Config) -> Result<()> {
    let db = Database::open(&config.server.db_path)?;
    db.reset()?;
    println!("All tasks and history cleared.");
    Ok(())
}
