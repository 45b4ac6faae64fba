/// Tool for progress reports over a date range
///
/// This module implements the habit_progress MCP tool.

use chrono::{Duration, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsEngine;
use crate::domain::{records_of, ProgressReport};
use crate::storage::HabitStorage;
use crate::tools::{parse_date, parse_habit_id, ToolError};

/// Days covered when no start date is given, today included
pub const DEFAULT_PROGRESS_DAYS: i64 = 30;

/// Parameters for a progress report
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProgressParams {
    /// ID of the habit
    pub habit_id: String,
    /// First day of the range (YYYY-MM-DD, defaults to 29 days before the end)
    pub start_date: Option<String>,
    /// Last day of the range (YYYY-MM-DD, defaults to today)
    pub end_date: Option<String>,
}

/// Response from a progress report
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub habit_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub report: ProgressReport,
    pub message: String,
}

/// Report completed versus expected occurrences for a habit
pub fn get_habit_progress<S: HabitStorage>(
    storage: &S,
    analytics: &AnalyticsEngine,
    params: ProgressParams,
    today: NaiveDate,
) -> Result<ProgressResponse, ToolError> {
    let habit = storage.get_habit(&parse_habit_id(&params.habit_id)?)?;

    let end = match params.end_date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => today,
    };
    let start = match params.start_date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => end - Duration::days(DEFAULT_PROGRESS_DAYS - 1),
    };

    if start > end {
        return Err(ToolError::InvalidParams(format!(
            "start_date {} is after end_date {}",
            start, end
        )));
    }

    let logs = storage.get_logs(&habit.id, None, None)?;
    let report = analytics.habit_progress(&habit, &records_of(&logs), start, end);

    let message = format!(
        "📈 '{}' from {} to {}: {} of {} expected ({}%). Current streak {}, best {}.",
        habit.title,
        start,
        end,
        report.completed,
        report.expected,
        report.percentage,
        report.streak.current,
        report.streak.longest
    );

    Ok(ProgressResponse {
        habit_id: habit.id.to_string(),
        start_date: start,
        end_date: end,
        report,
        message,
    })
}
