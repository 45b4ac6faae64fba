/// Database migration management
///
/// This module handles creating and updating the SQLite database schema.
/// It ensures the database has all the required tables and indexes.

use rusqlite::Connection;
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add new migrations
const CURRENT_VERSION: i32 = 2;

/// Initialize the database schema
///
/// This creates all required tables and indexes if they don't exist.
/// It also sets up the version tracking for future migrations. Pending
/// migrations and the new version number are committed together, so a
/// failed migration leaves the database at its previous version.
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version = get_current_version(conn)?;

    if current_version < CURRENT_VERSION {
        // Rolled back on drop if any step fails
        let tx = conn.unchecked_transaction()?;
        run_migrations(&tx, current_version)?;
        set_version(&tx, CURRENT_VERSION)?;
        tx.commit()?;
        tracing::info!("Database schema migrated from v{} to v{}", current_version, CURRENT_VERSION);
    } else if current_version > CURRENT_VERSION {
        return Err(StorageError::Migration(format!(
            "Database schema version {} is newer than supported version {}",
            current_version, CURRENT_VERSION
        )));
    }

    Ok(())
}

/// Get the current database schema version (0 for a fresh database)
fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version: Option<i32> = conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version.unwrap_or(0))
}

fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run database migrations from the current version to the latest
fn run_migrations(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
    if from_version < 1 {
        migration_v1(conn)?;
    }
    if from_version < 2 {
        migration_v2(conn)?;
    }

    Ok(())
}

/// Migration to version 1: habits, their logs and materialized streaks
fn migration_v1(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            frequency TEXT NOT NULL,
            days_of_week TEXT NOT NULL DEFAULT '[]',
            target_quantity REAL,
            unit TEXT,
            allow_multiple_logs BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TEXT NOT NULL,
            archived BOOLEAN NOT NULL DEFAULT FALSE
        );

        CREATE TABLE IF NOT EXISTS habit_logs (
            id TEXT PRIMARY KEY,
            habit_id TEXT NOT NULL,
            log_date TEXT NOT NULL,
            status TEXT NOT NULL,
            quantity REAL,
            note TEXT,
            inserted_at TEXT NOT NULL,
            FOREIGN KEY (habit_id) REFERENCES habits (id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS habit_streaks (
            habit_id TEXT PRIMARY KEY,
            current_streak INTEGER NOT NULL DEFAULT 0,
            longest_streak INTEGER NOT NULL DEFAULT 0,
            last_completion_date TEXT,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (habit_id) REFERENCES habits (id) ON DELETE CASCADE
        );",
    )?;

    create_indexes_v1(conn)?;

    tracing::info!("Applied migration v1: Created initial database schema");
    Ok(())
}

/// Create database indexes for version 1
///
/// Logs are not unique per (habit, date): habits that allow multiple logs
/// store several rows for the same day.
fn create_indexes_v1(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habit_logs_habit_date
         ON habit_logs (habit_id, log_date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habit_logs_date
         ON habit_logs (log_date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habits_archived
         ON habits (archived)",
        [],
    )?;

    tracing::info!("Created database indexes for v1");
    Ok(())
}

/// Migration to version 2: streak milestone achievements
fn migration_v2(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS achievements (
            id TEXT PRIMARY KEY,
            habit_id TEXT NOT NULL,
            milestone INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            achieved_at TEXT NOT NULL,
            UNIQUE (habit_id, milestone),
            FOREIGN KEY (habit_id) REFERENCES habits (id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_achievements_achieved_at
        ON achievements (achieved_at);",
    )?;

    tracing::info!("Applied migration v2: Created achievements table");
    Ok(())
}
