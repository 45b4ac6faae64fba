/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing and retrieving habits, logs and the
/// streak snapshots derived from them.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::NaiveDate;
use thiserror::Error;
use crate::domain::{Achievement, Habit, HabitId, HabitLog, LogId, LogRecord, StreakSnapshot};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Log not found: {log_id}")]
    LogNotFound { log_id: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the storage interface for habits
///
/// This trait allows us to potentially swap out SQLite for other databases
/// in the future while keeping the same interface.
pub trait HabitStorage {
    /// Create a new habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Update an existing habit
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Set or clear the archived flag
    fn archive_habit(&self, habit_id: &HabitId, archived: bool) -> Result<Habit, StorageError>;

    /// Delete a habit together with its logs and streak snapshot
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// List habits, newest first
    fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>, StorageError>;

    /// Record what happened on a day
    ///
    /// Unless the habit allows multiple logs per day, an existing log for the
    /// same date is overwritten instead of adding a second row.
    fn upsert_log(&self, habit: &Habit, record: &LogRecord) -> Result<HabitLog, StorageError>;

    /// Get the log for a habit on a date (the latest one if several exist)
    fn get_log_by_date(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
    ) -> Result<Option<HabitLog>, StorageError>;

    /// Get logs for a habit, optionally bounded by date (inclusive), newest first
    fn get_logs(
        &self,
        habit_id: &HabitId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<HabitLog>, StorageError>;

    /// Delete a single log, returning the row that was removed
    fn delete_log(&self, log_id: &LogId) -> Result<HabitLog, StorageError>;

    /// Replace the streak snapshot for a habit
    fn save_streak(&self, snapshot: &StreakSnapshot) -> Result<(), StorageError>;

    /// Get the streak snapshot for a habit (zeroed if none was saved yet)
    fn get_streak(&self, habit_id: &HabitId) -> Result<StreakSnapshot, StorageError>;

    /// Record an achievement unless the habit already holds that milestone
    ///
    /// Returns whether a new row was written.
    fn record_achievement(&self, achievement: &Achievement) -> Result<bool, StorageError>;

    /// List achievements, newest first, optionally for a single habit
    fn list_achievements(&self, habit_id: Option<&HabitId>) -> Result<Vec<Achievement>, StorageError>;
}
