/// Main entry point for the Habit Streak MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use habit_streak_mcp::{Clock, HabitStreakServer};

const DATA_DIR_NAME: &str = "habit_streak";
const DATABASE_FILE: &str = "habits.db";

/// Get the default database path, trying the first writable location
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let potential_paths = [
        dirs::home_dir().map(|p| p.join(format!(".{}", DATA_DIR_NAME))),
        dirs::data_dir().map(|p| p.join(DATA_DIR_NAME)),
        dirs::config_dir().map(|p| p.join(DATA_DIR_NAME)),
        std::env::current_dir()
            .ok()
            .map(|p| p.join(format!(".{}", DATA_DIR_NAME))),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            let marker = potential_path.join(".write_test");
            if std::fs::write(&marker, "ok").is_ok() {
                let _ = std::fs::remove_file(&marker);
                return Ok(potential_path.join(DATABASE_FILE));
            }
        }
    }

    // Last resort
    let temp_path = std::env::temp_dir().join(DATA_DIR_NAME);
    std::fs::create_dir_all(&temp_path)?;

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path.join(DATABASE_FILE))
}

/// Command line arguments for the Habit Streak MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// IANA time zone the owner's days are counted in (e.g. Europe/Berlin)
    /// If not provided, uses the machine's local time zone
    #[arg(long)]
    timezone: Option<Clock>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    // RUST_LOG wins over the command line flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("habit_streak_mcp={}", log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // stdout carries the protocol
        .init();

    info!("Starting Habit Streak MCP server");

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let mut server = HabitStreakServer::new(db_path).await?;
    if let Some(clock) = args.timezone {
        server = server.with_clock(clock);
    }
    server.run().await?;

    info!("Habit Streak MCP server shutdown complete");
    Ok(())
}
