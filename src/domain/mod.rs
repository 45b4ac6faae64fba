/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, HabitLog, StreakSnapshot)
/// and the streak engine that derives statistics from a habit's history.
/// Nothing in here performs I/O.

pub mod achievement;
pub mod habit;
pub mod log;
pub mod progress;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use achievement::*;
pub use habit::*;
pub use log::*;
pub use progress::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid habit title: {0}")]
    InvalidHabitTitle(String),

    #[error("Invalid frequency: {0}")]
    InvalidRule(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}
