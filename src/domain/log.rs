/// Log records for tracking what happened to a habit on a given day
///
/// `LogRecord` is the plain value the streak engine works on. `HabitLog` is
/// the persisted row wrapping it with identifiers and an insert timestamp.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{DomainError, HabitId, LogId, LogStatus};

/// What the user recorded for one calendar day
///
/// Dates carry no time component. They are already resolved to the habit
/// owner's calendar by whoever built the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Which day this record is for
    pub date: NaiveDate,
    /// Outcome for the day
    pub status: LogStatus,
    /// Amount achieved (e.g. pages read), never negative
    pub quantity: Option<f64>,
    /// Free-form note
    pub note: Option<String>,
}

impl LogRecord {
    /// Create a record with validation of the optional fields
    pub fn new(
        date: NaiveDate,
        status: LogStatus,
        quantity: Option<f64>,
        note: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_quantity(&quantity)?;
        Self::validate_note(&note)?;

        Ok(Self { date, status, quantity, note })
    }

    /// Shorthand for a record carrying only a date and a status
    pub fn with_status(date: NaiveDate, status: LogStatus) -> Self {
        Self { date, status, quantity: None, note: None }
    }

    /// Whether this record counts as a completion
    pub fn is_done(&self) -> bool {
        self.status == LogStatus::Done
    }

    fn validate_quantity(quantity: &Option<f64>) -> Result<(), DomainError> {
        if let Some(value) = quantity {
            if !value.is_finite() || *value < 0.0 {
                return Err(DomainError::InvalidValue {
                    message: "Quantity must be a non-negative number".to_string()
                });
            }
            if *value > 100000.0 {
                return Err(DomainError::InvalidValue {
                    message: "Quantity cannot exceed 100000".to_string()
                });
            }
        }
        Ok(())
    }

    fn validate_note(note: &Option<String>) -> Result<(), DomainError> {
        if let Some(text) = note {
            if text.chars().count() > 500 {
                return Err(DomainError::InvalidValue {
                    message: "Note cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }
}

/// A stored log row for a habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitLog {
    /// Unique identifier for this row
    pub id: LogId,
    /// Which habit this log belongs to
    pub habit_id: HabitId,
    /// When the row was first written
    pub inserted_at: DateTime<Utc>,
    /// The recorded day and outcome
    pub record: LogRecord,
}

impl HabitLog {
    /// Create a new log row for a habit
    pub fn new(habit_id: HabitId, record: LogRecord) -> Self {
        Self {
            id: LogId::new(),
            habit_id,
            inserted_at: Utc::now(),
            record,
        }
    }

    /// Create a log row from existing data (used when loading from database)
    pub fn from_existing(
        id: LogId,
        habit_id: HabitId,
        inserted_at: DateTime<Utc>,
        record: LogRecord,
    ) -> Self {
        Self { id, habit_id, inserted_at, record }
    }

    /// Check if this log has a non-blank note
    pub fn has_note(&self) -> bool {
        self.record
            .note
            .as_deref()
            .map_or(false, |n| !n.trim().is_empty())
    }
}

/// Strip storage metadata, keeping only what the streak engine reads
pub fn records_of(logs: &[HabitLog]) -> Vec<LogRecord> {
    logs.iter().map(|log| log.record.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_valid_record() {
        let record = LogRecord::new(
            date(2024, 3, 1),
            LogStatus::Done,
            Some(12.5),
            Some("Read two chapters".to_string()),
        );

        assert!(record.is_ok());
        let record = record.unwrap();
        assert!(record.is_done());
        assert_eq!(record.quantity, Some(12.5));
    }

    #[test]
    fn test_negative_quantity_invalid() {
        let result = LogRecord::new(date(2024, 3, 1), LogStatus::Partial, Some(-1.0), None);
        assert!(result.is_err());

        let result = LogRecord::new(date(2024, 3, 1), LogStatus::Partial, Some(f64::NAN), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_long_note_invalid() {
        let result = LogRecord::new(date(2024, 3, 1), LogStatus::Done, None, Some("x".repeat(501)));
        assert!(result.is_err());
    }

    #[test]
    fn test_habit_log_wraps_record() {
        let habit_id = HabitId::new();
        let log = HabitLog::new(
            habit_id.clone(),
            LogRecord::with_status(date(2024, 3, 2), LogStatus::Skipped),
        );

        assert_eq!(log.habit_id, habit_id);
        assert!(!log.record.is_done());
        assert!(!log.has_note());
        assert_eq!(records_of(&[log.clone()]), vec![log.record]);
    }
}
