/// Public library interface for the Habit Streak MCP server
///
/// This module exports the streak engine, storage layer and server so that
/// other applications and tests can use them directly.

use std::path::PathBuf;
use thiserror::Error;

// Internal modules
mod domain;
mod storage;
mod analytics;
mod mcp;
pub mod tools;

// Re-export public modules and types
pub use domain::*;
pub use storage::{HabitStorage, SqliteStorage, StorageError};
pub use analytics::{AnalyticsEngine, BestStreak, StatsReport, WeekdayActivity};
pub use mcp::protocol;
pub use mcp::server::tool_definitions;
pub use mcp::McpServer;
pub use tools::{Clock, ToolError};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Habit streak server backing the MCP protocol
///
/// Owns the SQLite connection and the analytics engine that the tools run
/// against, and the clock that decides which day "today" is.
pub struct HabitStreakServer {
    storage: SqliteStorage,
    analytics: AnalyticsEngine,
    clock: Clock,
}

impl HabitStreakServer {
    /// Create a server with the database at `db_path`
    ///
    /// This will initialize the SQLite schema if it doesn't already exist.
    pub async fn new(db_path: PathBuf) -> Result<Self, ServerError> {
        tracing::info!("Initializing Habit Streak server with database: {:?}", db_path);

        let storage = SqliteStorage::new(&db_path)?;

        Ok(Self {
            storage,
            analytics: AnalyticsEngine::new(),
            clock: Clock::local(),
        })
    }

    /// Create a server backed by a private in-memory database
    pub fn in_memory() -> Result<Self, ServerError> {
        Ok(Self {
            storage: SqliteStorage::open_in_memory()?,
            analytics: AnalyticsEngine::new(),
            clock: Clock::local(),
        })
    }

    /// Count days on `clock` instead of the machine's local calendar
    pub fn with_clock(mut self, clock: Clock) -> Self {
        tracing::info!("Counting days in time zone: {}", clock);
        self.clock = clock;
        self
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method returns once stdin is closed or an I/O error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        let habits = self.storage.list_habits(true)?;
        tracing::info!("Server started successfully, found {} existing habits", habits.len());

        let mut mcp_server = McpServer::new(self);
        mcp_server.run().await
    }

    /// Get a reference to the storage layer
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Get a reference to the analytics engine
    pub fn analytics(&self) -> &AnalyticsEngine {
        &self.analytics
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }
}
