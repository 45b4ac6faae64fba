/// Tool for statistics across all habits
///
/// This module implements the habit_stats MCP tool.

use chrono::{Duration, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsEngine, StatsReport};
use crate::domain::records_of;
use crate::storage::HabitStorage;
use crate::tools::ToolError;

/// Days covered when no window is given, today included
pub const DEFAULT_STATS_DAYS: u32 = 30;

/// Parameters for habit statistics
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct StatsParams {
    /// Number of days to look back, today included (default 30)
    pub days: Option<u32>,
}

/// Response with aggregate statistics
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub stats: StatsReport,
    pub message: String,
}

/// Aggregate completions, weekday activity and the best streak over a window
pub fn get_habit_stats<S: HabitStorage>(
    storage: &S,
    analytics: &AnalyticsEngine,
    params: StatsParams,
    today: NaiveDate,
) -> Result<StatsResponse, ToolError> {
    let days = params.days.unwrap_or(DEFAULT_STATS_DAYS);
    if days == 0 || days > 3660 {
        return Err(ToolError::InvalidParams(
            "days must be between 1 and 3660".to_string(),
        ));
    }
    let start = today - Duration::days(days as i64 - 1);

    // Full histories: a streak may have started before the window
    let mut habits = Vec::new();
    for habit in storage.list_habits(true)? {
        let logs = storage.get_logs(&habit.id, None, Some(today))?;
        habits.push((habit, records_of(&logs)));
    }

    let stats = analytics.stats(&habits, start, today);

    let busiest = stats
        .weekday_activity
        .labeled()
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .fold(None, |best: Option<(&str, u32)>, (day, count)| match best {
            Some((_, top)) if top >= count => best,
            _ => Some((day, count)),
        });

    let mut message = format!(
        "📊 Last {} days: {} completions across {} active habits.",
        days, stats.total_completed, stats.active_habits
    );
    if let Some((day, count)) = busiest {
        message.push_str(&format!("\n📅 Most active day: {} ({} completions)", day, count));
    }
    if let Some(best) = stats.best_streak.as_ref().filter(|b| b.current_streak > 0) {
        message.push_str(&format!(
            "\n🏆 Best current streak: '{}' at {}",
            best.title, best.current_streak
        ));
    }

    Ok(StatsResponse {
        start_date: start,
        end_date: today,
        stats,
        message,
    })
}
