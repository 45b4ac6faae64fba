/// Tool for listing earned achievements
///
/// This module implements the habit_achievements MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::Achievement;
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, ToolError};

/// Parameters for listing achievements
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct AchievementsParams {
    /// Only show achievements of this habit (default: all habits)
    pub habit_id: Option<String>,
}

/// Response listing achievements, newest first
#[derive(Debug, Serialize)]
pub struct AchievementsResponse {
    pub achievements: Vec<Achievement>,
    pub message: String,
}

pub fn list_achievements<S: HabitStorage>(
    storage: &S,
    params: AchievementsParams,
) -> Result<AchievementsResponse, ToolError> {
    let habit = match params.habit_id.as_deref() {
        Some(raw) => Some(storage.get_habit(&parse_habit_id(raw)?)?),
        None => None,
    };

    let achievements = storage.list_achievements(habit.as_ref().map(|h| &h.id))?;

    let mut message = match (&habit, achievements.len()) {
        (Some(h), 0) => format!("No achievements for '{}' yet. Keep the streak going!", h.title),
        (None, 0) => "No achievements yet. Keep the streak going!".to_string(),
        (Some(h), n) => format!("🏅 {} achievement(s) for '{}':", n, h.title),
        (None, n) => format!("🏅 {} achievement(s):", n),
    };
    for achievement in &achievements {
        message.push_str(&format!(
            "\n- {} ({})",
            achievement.title,
            achievement.achieved_at.format("%Y-%m-%d")
        ));
    }

    Ok(AchievementsResponse {
        achievements,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HabitId, LogRecord, LogStatus, RecurrenceRule};
    use crate::tools::refresh_streak;
    use crate::tools::test_support::{date, storage_with};

    #[test]
    fn test_lists_milestones_of_a_habit() {
        let (storage, habit) = storage_with(RecurrenceRule::Daily);
        for day in 1..=3 {
            storage
                .upsert_log(&habit, &LogRecord::with_status(date(2024, 3, day), LogStatus::Done))
                .unwrap();
        }
        refresh_streak(&storage, &habit).unwrap();

        let response = list_achievements(&storage, AchievementsParams {
            habit_id: Some(habit.id.to_string()),
        })
        .unwrap();
        assert_eq!(response.achievements.len(), 1);
        assert!(response.message.contains("3-day streak"));

        let everything = list_achievements(&storage, AchievementsParams::default()).unwrap();
        assert_eq!(everything.achievements.len(), 1);
    }

    #[test]
    fn test_empty_and_unknown_habit() {
        let (storage, habit) = storage_with(RecurrenceRule::Daily);

        let response = list_achievements(&storage, AchievementsParams {
            habit_id: Some(habit.id.to_string()),
        })
        .unwrap();
        assert!(response.achievements.is_empty());
        assert!(response.message.starts_with("No achievements for 'Meditate'"));

        let result = list_achievements(&storage, AchievementsParams {
            habit_id: Some(HabitId::new().to_string()),
        });
        assert!(matches!(result, Err(ToolError::Storage(_))));
    }
}
