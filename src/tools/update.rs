/// Tools for updating and deleting existing habits
///
/// This module implements the habit_update and habit_delete MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{HabitChanges, RecurrenceRule, StreakSnapshot};
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, refresh_streak, ToolError};

/// Parameters for updating an existing habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    /// ID of the habit to update
    pub habit_id: String,
    /// New title
    pub title: Option<String>,
    /// New frequency: daily, weekly, monthly, specific_days or multiple_times_daily
    pub frequency: Option<String>,
    /// Weekdays for specific_days (0 = Sunday .. 6 = Saturday)
    pub days_of_week: Option<Vec<u8>>,
    /// New target per occurrence
    pub target_quantity: Option<f64>,
    /// New unit for the target
    pub unit: Option<String>,
    /// Allow several logs on the same day
    pub allow_multiple_logs: Option<bool>,
    /// Archive (true) or restore (false) the habit
    pub archived: Option<bool>,
}

/// Response from updating a habit
#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub success: bool,
    pub streak: StreakSnapshot,
    pub message: String,
}

/// Parameters for deleting a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteHabitParams {
    /// ID of the habit to delete, together with all its logs
    pub habit_id: String,
}

/// Response from deleting a habit
#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub success: bool,
    pub message: String,
}

/// Update an existing habit using the provided storage
pub fn update_habit<S: HabitStorage>(
    storage: &S,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let mut habit = storage.get_habit(&habit_id)?;

    // Days alone re-parameterise an existing specific-days rule
    let rule = match (params.frequency.as_deref(), params.days_of_week.as_deref()) {
        (Some(tag), days) => Some(RecurrenceRule::parse(tag, days.unwrap_or(&[]))?),
        (None, Some(days)) if matches!(habit.rule, RecurrenceRule::SpecificDaysOfWeek(_)) => {
            Some(RecurrenceRule::specific_days(days)?)
        }
        (None, Some(_)) => {
            return Err(ToolError::InvalidParams(
                "days_of_week only applies to specific_days habits".to_string(),
            ))
        }
        (None, None) => None,
    };
    let rule_changed = rule.as_ref().map_or(false, |r| *r != habit.rule);

    habit.update(HabitChanges {
        title: params.title,
        rule,
        target_quantity: params.target_quantity.map(Some),
        unit: params.unit.map(Some),
        allow_multiple_logs: params.allow_multiple_logs,
        archived: params.archived,
    })?;

    storage.update_habit(&habit)?;

    // Adjacency depends on the rule, so a new rule means a new streak
    let streak = if rule_changed {
        tracing::info!("Frequency of habit {} changed, recomputing streak", habit.id);
        refresh_streak(storage, &habit)?.snapshot
    } else {
        storage.get_streak(&habit.id)?
    };

    let message = match params.archived {
        Some(true) => format!("📦 Archived habit '{}'", habit.title),
        Some(false) => format!("▶️ Restored habit '{}'", habit.title),
        None => format!("✅ Updated habit '{}' ({})", habit.title, habit.rule.display_name()),
    };

    Ok(UpdateHabitResponse {
        success: true,
        streak,
        message,
    })
}

/// Delete a habit with its logs and streak snapshot
pub fn delete_habit<S: HabitStorage>(
    storage: &S,
    params: DeleteHabitParams,
) -> Result<DeleteHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.get_habit(&habit_id)?;
    storage.delete_habit(&habit_id)?;

    tracing::info!("Deleted habit '{}' ({})", habit.title, habit.id);

    Ok(DeleteHabitResponse {
        success: true,
        message: format!("🗑️ Deleted habit '{}' and its history", habit.title),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LogRecord, LogStatus};
    use crate::storage::StorageError;
    use crate::tools::test_support::{date, storage_with};

    fn params(habit_id: String) -> UpdateHabitParams {
        UpdateHabitParams {
            habit_id,
            title: None,
            frequency: None,
            days_of_week: None,
            target_quantity: None,
            unit: None,
            allow_multiple_logs: None,
            archived: None,
        }
    }

    #[test]
    fn test_frequency_change_recomputes_streak() {
        let (storage, habit) = storage_with(RecurrenceRule::Daily);
        // One completion in each of three consecutive ISO weeks
        for (m, d) in [(3, 4), (3, 12), (3, 20)] {
            storage
                .upsert_log(&habit, &LogRecord::with_status(date(2024, m, d), LogStatus::Done))
                .unwrap();
        }
        refresh_streak(&storage, &habit).unwrap();
        assert_eq!(storage.get_streak(&habit.id).unwrap().current_streak, 1);

        let mut update = params(habit.id.to_string());
        update.frequency = Some("weekly".to_string());
        let response = update_habit(&storage, update).unwrap();

        assert_eq!(response.streak.current_streak, 3);
        assert_eq!(storage.get_habit(&habit.id).unwrap().rule, RecurrenceRule::Weekly);
    }

    #[test]
    fn test_days_only_update_requires_specific_days_rule() {
        let (storage, habit) = storage_with(RecurrenceRule::Daily);
        let mut update = params(habit.id.to_string());
        update.days_of_week = Some(vec![1]);
        assert!(matches!(update_habit(&storage, update), Err(ToolError::InvalidParams(_))));

        let (storage, habit) = storage_with(RecurrenceRule::specific_days(&[1, 3]).unwrap());
        let mut update = params(habit.id.to_string());
        update.days_of_week = Some(vec![2, 4]);
        update_habit(&storage, update).unwrap();
        assert_eq!(storage.get_habit(&habit.id).unwrap().rule.day_indexes(), vec![2, 4]);
    }

    #[test]
    fn test_invalid_update_leaves_habit_untouched() {
        let (storage, habit) = storage_with(RecurrenceRule::Daily);
        let mut update = params(habit.id.to_string());
        update.title = Some("Evening walk".to_string());
        update.target_quantity = Some(-5.0);

        assert!(update_habit(&storage, update).is_err());
        assert_eq!(storage.get_habit(&habit.id).unwrap().title, "Meditate");
    }

    #[test]
    fn test_archive_message() {
        let (storage, habit) = storage_with(RecurrenceRule::Daily);
        let mut update = params(habit.id.to_string());
        update.archived = Some(true);

        let response = update_habit(&storage, update).unwrap();
        assert!(response.message.contains("Archived"));
        assert!(storage.get_habit(&habit.id).unwrap().archived);
    }

    #[test]
    fn test_delete_habit_removes_history() {
        let (storage, habit) = storage_with(RecurrenceRule::Daily);
        storage
            .upsert_log(&habit, &LogRecord::with_status(date(2024, 3, 1), LogStatus::Done))
            .unwrap();

        delete_habit(&storage, DeleteHabitParams { habit_id: habit.id.to_string() }).unwrap();

        assert!(matches!(
            storage.get_habit(&habit.id),
            Err(StorageError::HabitNotFound { .. })
        ));
        assert!(storage.get_logs(&habit.id, None, None).unwrap().is_empty());
    }
}
