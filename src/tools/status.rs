/// Tool for checking habit status and streaks
///
/// This module implements the habit_status MCP tool.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{period_label, records_of, Habit, StreakSnapshot};
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, ToolError};

/// Parameters for checking habit status
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StatusParams {
    /// ID of a single habit (omit for every active habit)
    pub habit_id: Option<String>,
}

/// Information about a single habit's status
#[derive(Debug, Serialize)]
pub struct HabitStatus {
    pub habit_id: String,
    pub title: String,
    pub frequency: String,
    /// Current streak as of today, zero once the streak went stale
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completed: Option<NaiveDate>,
    pub streak_active: bool,
    pub due_today: bool,
    pub completed_today: bool,
    pub motivation: String,
}

/// Response from checking habit status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub habits: Vec<HabitStatus>,
    pub summary: String,
    pub message: String,
}

/// Get status for one habit, or all active habits, as of `today`
pub fn get_habit_status<S: HabitStorage>(
    storage: &S,
    params: StatusParams,
    today: NaiveDate,
) -> Result<StatusResponse, ToolError> {
    let habits = match params.habit_id.as_deref() {
        Some(raw) => vec![storage.get_habit(&parse_habit_id(raw)?)?],
        None => storage.list_habits(false)?,
    };

    let mut statuses = Vec::with_capacity(habits.len());
    for habit in &habits {
        statuses.push(habit_status(storage, habit, today)?);
    }

    let summary = if statuses.is_empty() {
        "No habits found. Create your first habit to get started!".to_string()
    } else {
        let active = statuses.iter().filter(|s| s.streak_active).count();
        let due = statuses.iter().filter(|s| s.due_today && !s.completed_today).count();
        format!(
            "📊 Status: {} of {} habits on a live streak, {} still due today",
            active,
            statuses.len(),
            due
        )
    };

    let details = statuses
        .iter()
        .map(|s| {
            let last = s
                .last_completed
                .map(|d| format!("\n   Last completed: {}", d))
                .unwrap_or_default();
            let due = if s.due_today && !s.completed_today { " ⏰ due today" } else { "" };
            format!(
                "🎯 {} ({}){}\n   Current streak: {} | Best: {}{}\n   {}",
                s.title, s.frequency, due, s.current_streak, s.longest_streak, last, s.motivation
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(StatusResponse {
        message: format!("{}\n\n{}", summary, details),
        habits: statuses,
        summary,
    })
}

fn habit_status<S: HabitStorage>(
    storage: &S,
    habit: &Habit,
    today: NaiveDate,
) -> Result<HabitStatus, ToolError> {
    let logs = storage.get_logs(&habit.id, None, None)?;
    let derived = StreakSnapshot::derive(habit.id.clone(), &records_of(&logs), &habit.rule);

    // Repair snapshots written before a log was changed outside the tools
    if storage.get_streak(&habit.id)? != derived {
        tracing::warn!("Stale streak snapshot for habit {}, rewriting", habit.id);
        storage.save_streak(&derived)?;
    }

    let current_streak = derived.current_on(today, &habit.rule);
    let shown = StreakSnapshot {
        current_streak,
        ..derived.clone()
    };
    let completed_today = logs
        .iter()
        .any(|log| log.record.date == today && log.record.is_done());

    Ok(HabitStatus {
        habit_id: habit.id.to_string(),
        title: habit.title.clone(),
        frequency: habit.rule.display_name(),
        current_streak,
        longest_streak: derived.longest_streak,
        last_completed: derived.last_completion_date,
        streak_active: derived.is_active_on(today, &habit.rule),
        due_today: habit.rule.is_due_on(today),
        completed_today,
        motivation: if current_streak == 0 && derived.longest_streak > 0 {
            format!(
                "Your best was {} {}. Log today to start a new streak!",
                derived.longest_streak,
                period_label(&habit.rule, derived.longest_streak)
            )
        } else {
            shown.motivational_message(&habit.rule)
        },
    })
}
