/// Tool for listing all habits
///
/// This module implements the habit_list MCP tool.

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::storage::HabitStorage;
use crate::tools::ToolError;

/// Parameters for listing habits
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Include archived habits (default false)
    #[serde(default)]
    pub include_archived: bool,
    /// Sort order: title, streak or created_at (default created_at, newest first)
    pub sort_by: Option<String>,
}

/// Information about a habit in the list
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    pub habit_id: String,
    pub title: String,
    pub frequency: String,
    pub target: Option<String>,
    /// Streak as of today; 0 once the run has lapsed
    pub current_streak: u32,
    pub longest_streak: u32,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitSummary>,
    pub total_habits: u32,
    pub archived_habits: u32,
}

/// List habits using the provided storage
///
/// Streaks are reported as of `today`, the same way habit_status does.
pub fn list_habits<S: HabitStorage>(
    storage: &S,
    params: ListHabitsParams,
    today: NaiveDate,
) -> Result<ListHabitsResponse, ToolError> {
    let habits = storage.list_habits(params.include_archived)?;

    let mut summaries = Vec::with_capacity(habits.len());
    for habit in habits {
        let streak = storage.get_streak(&habit.id)?;
        summaries.push(HabitSummary {
            habit_id: habit.id.to_string(),
            frequency: habit.rule.display_name(),
            target: habit.target_display(),
            title: habit.title,
            current_streak: streak.current_on(today, &habit.rule),
            longest_streak: streak.longest_streak,
            archived: habit.archived,
            created_at: habit.created_at,
        });
    }

    match params.sort_by.as_deref().map(str::trim) {
        None | Some("") | Some("created_at") => {}
        Some("title") | Some("name") => {
            summaries.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        }
        Some("streak") => summaries.sort_by(|a, b| b.current_streak.cmp(&a.current_streak)),
        Some(other) => {
            return Err(ToolError::InvalidParams(format!(
                "Unknown sort_by '{}'. Valid options: title, streak, created_at",
                other
            )))
        }
    }

    Ok(ListHabitsResponse {
        total_habits: summaries.len() as u32,
        archived_habits: summaries.iter().filter(|h| h.archived).count() as u32,
        habits: summaries,
    })
}
