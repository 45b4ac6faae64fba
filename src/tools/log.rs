/// Tools for logging habit outcomes
///
/// This module implements the habit_log and habit_log_delete MCP tools.
/// After every change to a habit's logs the streak snapshot is derived again
/// from the full history and persisted, and any streak milestone the habit
/// reached for the first time is recorded as an achievement.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use chrono::NaiveDate;

use crate::domain::{
    milestones_reached, period_label, records_of, Achievement, Habit, LogRecord, LogStatus,
    StreakSnapshot,
};
use crate::storage::HabitStorage;
use crate::tools::{parse_date, parse_habit_id, parse_log_id, ToolError};

/// Parameters for logging a habit outcome
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogHabitParams {
    /// ID of the habit to log
    pub habit_id: String,
    /// Day being logged (YYYY-MM-DD, defaults to today)
    pub date: Option<String>,
    /// done, partial, skipped or failed (defaults to done)
    pub status: Option<String>,
    /// Amount achieved (optional, e.g. 30 for 30 minutes)
    pub quantity: Option<f64>,
    /// Optional note about the day
    pub note: Option<String>,
}

/// Response from logging a habit
#[derive(Debug, Serialize)]
pub struct LogHabitResponse {
    pub log_id: String,
    pub streak: StreakSnapshot,
    /// Milestones reached for the first time by this log
    pub new_achievements: Vec<Achievement>,
    pub message: String,
}

/// Parameters for deleting a log
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteLogParams {
    /// ID of the log to delete
    pub log_id: String,
}

/// Response from deleting a log
#[derive(Debug, Serialize)]
pub struct DeleteLogResponse {
    pub streak: StreakSnapshot,
    pub message: String,
}

/// Outcome of re-deriving a habit's streak
#[derive(Debug)]
pub struct StreakRefresh {
    pub snapshot: StreakSnapshot,
    pub new_achievements: Vec<Achievement>,
}

/// Derive the streak snapshot from the habit's full history and store it
///
/// Milestones are awarded from the longest streak and never taken back, so
/// deleting a log later leaves earned achievements in place.
pub fn refresh_streak<S: HabitStorage>(
    storage: &S,
    habit: &Habit,
) -> Result<StreakRefresh, ToolError> {
    let logs = storage.get_logs(&habit.id, None, None)?;
    let snapshot = StreakSnapshot::derive(habit.id.clone(), &records_of(&logs), &habit.rule);
    storage.save_streak(&snapshot)?;

    tracing::debug!(
        "Streak for habit {}: current {}, longest {}",
        habit.id,
        snapshot.current_streak,
        snapshot.longest_streak
    );

    let mut new_achievements = Vec::new();
    for milestone in milestones_reached(snapshot.longest_streak) {
        let achievement =
            Achievement::for_milestone(habit.id.clone(), &habit.title, &habit.rule, milestone);
        if storage.record_achievement(&achievement)? {
            new_achievements.push(achievement);
        }
    }

    Ok(StreakRefresh {
        snapshot,
        new_achievements,
    })
}

/// Log a habit outcome using the provided storage
///
/// `today` is the owner's date, used when the call names no date.
pub fn log_habit<S: HabitStorage>(
    storage: &S,
    params: LogHabitParams,
    today: NaiveDate,
) -> Result<LogHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.get_habit(&habit_id)?;

    let date = match params.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => today,
    };

    let status = match params.status.as_deref() {
        Some(raw) => LogStatus::parse(raw)?,
        None => LogStatus::Done,
    };

    let record = LogRecord::new(date, status, params.quantity, params.note)?;
    let log = storage.upsert_log(&habit, &record)?;
    let StreakRefresh {
        snapshot: streak,
        new_achievements,
    } = refresh_streak(storage, &habit)?;

    let mut message = match status {
        LogStatus::Done => format!(
            "🔥 Logged '{}' as done for {}! Current streak: {} {}",
            habit.title,
            date,
            streak.current_streak,
            period_label(&habit.rule, streak.current_streak)
        ),
        other => format!(
            "📝 Logged '{}' as {} for {}. Current streak: {} {}",
            habit.title,
            other.as_tag().to_lowercase(),
            date,
            streak.current_streak,
            period_label(&habit.rule, streak.current_streak)
        ),
    };
    for achievement in &new_achievements {
        message.push_str(&format!("\n🏅 Achievement unlocked: {}", achievement.title));
    }

    Ok(LogHabitResponse {
        log_id: log.id.to_string(),
        streak,
        new_achievements,
        message,
    })
}

/// Delete a log and recompute the habit's streak
pub fn delete_log<S: HabitStorage>(
    storage: &S,
    params: DeleteLogParams,
) -> Result<DeleteLogResponse, ToolError> {
    let log_id = parse_log_id(&params.log_id)?;
    let removed = storage.delete_log(&log_id)?;
    let habit = storage.get_habit(&removed.habit_id)?;
    let streak = refresh_streak(storage, &habit)?.snapshot;

    Ok(DeleteLogResponse {
        message: format!(
            "🗑️ Removed the {} log of '{}'. Current streak: {} {}",
            removed.record.date,
            habit.title,
            streak.current_streak,
            period_label(&habit.rule, streak.current_streak)
        ),
        streak,
    })
}
