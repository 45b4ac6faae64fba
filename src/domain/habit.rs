/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents something the
/// user wants to do regularly, along with its validation rules.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{DomainError, HabitId, RecurrenceRule};

/// A habit the user wants to perform on a recurring schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display title (e.g., "Morning Run", "Read 20 pages")
    pub title: String,
    /// How often this habit should be performed
    pub rule: RecurrenceRule,
    /// Optional numeric target per occurrence (e.g., 20 for "20 pages")
    pub target_quantity: Option<f64>,
    /// Unit for the target quantity (e.g., "minutes", "pages")
    pub unit: Option<String>,
    /// Whether several logs may be recorded for the same day
    pub allow_multiple_logs: bool,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Archived habits are hidden from default listings but keep their history
    pub archived: bool,
}

/// Field changes applied by `Habit::update`
///
/// `None` leaves a field untouched. For the optional fields, `Some(None)`
/// clears the value.
#[derive(Debug, Clone, Default)]
pub struct HabitChanges {
    pub title: Option<String>,
    pub rule: Option<RecurrenceRule>,
    pub target_quantity: Option<Option<f64>>,
    pub unit: Option<Option<String>>,
    pub allow_multiple_logs: Option<bool>,
    pub archived: Option<bool>,
}

impl Habit {
    /// Create a new habit with validation
    pub fn new(
        title: String,
        rule: RecurrenceRule,
        target_quantity: Option<f64>,
        unit: Option<String>,
        allow_multiple_logs: bool,
    ) -> Result<Self, DomainError> {
        let title = Self::validate_title(&title)?;
        rule.validate()?;
        Self::validate_target_and_unit(&target_quantity, &unit)?;

        Ok(Self {
            id: HabitId::new(),
            title,
            rule,
            target_quantity,
            unit,
            allow_multiple_logs,
            created_at: Utc::now(),
            archived: false,
        })
    }

    /// Create a habit from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated.
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        title: String,
        rule: RecurrenceRule,
        target_quantity: Option<f64>,
        unit: Option<String>,
        allow_multiple_logs: bool,
        created_at: DateTime<Utc>,
        archived: bool,
    ) -> Self {
        Self {
            id,
            title,
            rule,
            target_quantity,
            unit,
            allow_multiple_logs,
            created_at,
            archived,
        }
    }

    /// Apply changes after validating all of them
    ///
    /// Nothing is modified if any change is invalid.
    pub fn update(&mut self, changes: HabitChanges) -> Result<(), DomainError> {
        let title = match changes.title {
            Some(ref title) => Some(Self::validate_title(title)?),
            None => None,
        };

        if let Some(ref rule) = changes.rule {
            rule.validate()?;
        }

        // Target and unit are validated together
        let new_target = changes.target_quantity.unwrap_or(self.target_quantity);
        let new_unit = changes.unit.clone().unwrap_or_else(|| self.unit.clone());
        Self::validate_target_and_unit(&new_target, &new_unit)?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(rule) = changes.rule {
            self.rule = rule;
        }
        self.target_quantity = new_target;
        self.unit = new_unit;
        if let Some(allow) = changes.allow_multiple_logs {
            self.allow_multiple_logs = allow;
        }
        if let Some(archived) = changes.archived {
            self.archived = archived;
        }

        Ok(())
    }

    /// Get a display string for the target (e.g., "20 pages")
    pub fn target_display(&self) -> Option<String> {
        match (self.target_quantity, &self.unit) {
            (Some(value), Some(unit)) => Some(format!("{} {}", value, unit)),
            (Some(value), None) => Some(value.to_string()),
            _ => None,
        }
    }

    // Validation helper methods

    /// Returns the trimmed title
    fn validate_title(title: &str) -> Result<String, DomainError> {
        let trimmed = title.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitTitle(
                "Habit title cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(DomainError::InvalidHabitTitle(
                "Habit title cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(trimmed.to_string())
    }

    fn validate_target_and_unit(
        target_quantity: &Option<f64>,
        unit: &Option<String>,
    ) -> Result<(), DomainError> {
        if let Some(value) = target_quantity {
            if !value.is_finite() || *value <= 0.0 {
                return Err(DomainError::InvalidValue {
                    message: "Target quantity must be greater than 0".to_string()
                });
            }
        }

        if let Some(unit_str) = unit {
            let trimmed = unit_str.trim();
            if trimmed.is_empty() {
                return Err(DomainError::InvalidValue {
                    message: "Unit cannot be empty if specified".to_string()
                });
            }
            if trimmed.chars().count() > 20 {
                return Err(DomainError::InvalidValue {
                    message: "Unit cannot be longer than 20 characters".to_string()
                });
            }
        }

        Ok(())
    }
}
