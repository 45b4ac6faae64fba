/// MCP tools for habit management
///
/// This module contains all the MCP tools that external clients can call to
/// interact with the habit tracker. Each tool is a plain function over a
/// `HabitStorage`, so the server owns no habit state of its own.

pub mod achievements;
pub mod create;
pub mod log;
pub mod status;
pub mod progress;
pub mod list;
pub mod stats;
pub mod update;

// Re-export tool functions for easy access
pub use achievements::*;
pub use create::*;
pub use log::*;
pub use status::*;
pub use progress::*;
pub use list::*;
pub use stats::*;
pub use update::*;

use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::domain::{DomainError, HabitId, LogId};
use crate::storage::StorageError;

/// Errors returned by tool calls
#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

/// Calendar the owner's days are counted in
///
/// Without a configured zone the server machine's local calendar is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    zone: Option<Tz>,
}

impl Clock {
    /// The server machine's local calendar
    pub fn local() -> Self {
        Self { zone: None }
    }

    /// The calendar of an IANA time zone
    pub fn in_zone(zone: Tz) -> Self {
        Self { zone: Some(zone) }
    }

    pub fn zone(&self) -> Option<Tz> {
        self.zone
    }

    /// Today's date for the owner
    pub fn today(&self) -> NaiveDate {
        self.date_at(Utc::now())
    }

    /// The owner's calendar date at `instant`
    pub fn date_at(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self.zone {
            Some(zone) => instant.with_timezone(&zone).date_naive(),
            None => instant.with_timezone(&Local).date_naive(),
        }
    }
}

impl FromStr for Clock {
    type Err = String;

    /// Parse an IANA zone name such as `Europe/Berlin`
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim()
            .parse::<Tz>()
            .map(Self::in_zone)
            .map_err(|e| format!("unknown time zone '{}': {}", raw, e))
    }
}

impl std::fmt::Display for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.zone {
            Some(zone) => write!(f, "{}", zone.name()),
            None => write!(f, "local"),
        }
    }
}

pub(crate) fn parse_habit_id(raw: &str) -> Result<HabitId, ToolError> {
    if raw.trim().is_empty() {
        return Err(ToolError::InvalidParams("Habit ID cannot be empty".to_string()));
    }
    HabitId::from_string(raw)
        .map_err(|_| ToolError::InvalidParams(format!("Invalid habit ID format: '{}'", raw)))
}

pub(crate) fn parse_log_id(raw: &str) -> Result<LogId, ToolError> {
    LogId::from_string(raw)
        .map_err(|_| ToolError::InvalidParams(format!("Invalid log ID format: '{}'", raw)))
}

/// Parse a `YYYY-MM-DD` date
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::InvalidDate(format!("'{}', expected YYYY-MM-DD", raw)).into())
}
