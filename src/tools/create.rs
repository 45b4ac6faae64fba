/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{Habit, RecurrenceRule, StreakSnapshot};
use crate::storage::HabitStorage;
use crate::tools::ToolError;

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit
    pub title: String,
    /// How often: daily, weekly, monthly, specific_days or multiple_times_daily
    pub frequency: String,
    /// Weekdays for specific_days (0 = Sunday .. 6 = Saturday)
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    /// Optional numeric target per occurrence (e.g. 20)
    pub target_quantity: Option<f64>,
    /// Unit of the target (e.g. "pages")
    pub unit: Option<String>,
    /// Allow several logs on the same day (default false)
    #[serde(default)]
    pub allow_multiple_logs: bool,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub habit_id: String,
    pub message: String,
}

/// Create a new habit using the provided storage
pub fn create_habit<S: HabitStorage>(
    storage: &S,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, ToolError> {
    let rule = RecurrenceRule::parse(&params.frequency, &params.days_of_week)?;

    let habit = Habit::new(
        params.title,
        rule,
        params.target_quantity,
        params.unit,
        params.allow_multiple_logs,
    )?;

    storage.create_habit(&habit)?;
    storage.save_streak(&StreakSnapshot::new(habit.id.clone()))?;

    tracing::info!("Created habit '{}' ({})", habit.title, habit.id);

    let target = habit
        .target_display()
        .map(|t| format!(", target {}", t))
        .unwrap_or_default();

    Ok(CreateHabitResponse {
        habit_id: habit.id.to_string(),
        message: format!(
            "✅ Created habit '{}' ({}{})! Ready to start your streak!",
            habit.title,
            habit.rule.display_name(),
            target
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HabitId;
    use crate::storage::SqliteStorage;

    fn params(title: &str, frequency: &str, days: Vec<u8>) -> CreateHabitParams {
        CreateHabitParams {
            title: title.to_string(),
            frequency: frequency.to_string(),
            days_of_week: days,
            target_quantity: None,
            unit: None,
            allow_multiple_logs: false,
        }
    }

    #[test]
    fn test_create_specific_days_habit() {
        let storage = SqliteStorage::open_in_memory().unwrap();

        let response = create_habit(&storage, params("Gym", "specific_days", vec![1, 3, 5])).unwrap();
        assert!(response.message.contains("Monday, Wednesday, Friday"));

        let habit_id = HabitId::from_string(&response.habit_id).unwrap();
        let habit = storage.get_habit(&habit_id).unwrap();
        assert_eq!(habit.rule.day_indexes(), vec![1, 3, 5]);
        assert_eq!(storage.get_streak(&habit_id).unwrap().current_streak, 0);
    }

    #[test]
    fn test_rejects_unknown_frequency() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let result = create_habit(&storage, params("Gym", "hourly", vec![]));
        assert!(matches!(result, Err(ToolError::Domain(_))));
    }

    #[test]
    fn test_rejects_specific_days_without_days() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let result = create_habit(&storage, params("Gym", "specific_days", vec![]));
        assert!(result.is_err());
        assert!(storage.list_habits(true).unwrap().is_empty());
    }
}
