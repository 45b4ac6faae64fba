/// Analytics engine for habit statistics
///
/// This module routes habits and their records through the streak engine
/// and aggregates the results across habits for the statistics view.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{
    compute_progress, compute_streak, weekday_from_index, weekday_name, Habit, HabitId, LogRecord,
    ProgressReport, StreakResult, StreakSnapshot,
};

/// Done records per weekday, Sunday first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WeekdayActivity(pub [u32; 7]);

impl WeekdayActivity {
    /// Pairs of weekday name and completion count, Sunday first
    pub fn labeled(&self) -> Vec<(&'static str, u32)> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(index, count)| {
                weekday_from_index(index as u8).map(|day| (weekday_name(day), *count))
            })
            .collect()
    }
}

/// The habit currently holding the best streak
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestStreak {
    pub habit_id: HabitId,
    pub title: String,
    pub current_streak: u32,
}

/// Aggregate statistics over a set of habits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    /// Done records across all habits
    pub total_completed: u32,
    /// Habits that are not archived
    pub active_habits: u32,
    pub weekday_activity: WeekdayActivity,
    pub best_streak: Option<BestStreak>,
}

/// Analytics engine for processing habit data
///
/// Stateless: every method derives its result from the arguments alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self
    }

    /// Streak for a habit, using the habit's own recurrence rule
    pub fn habit_streak(&self, habit: &Habit, records: &[LogRecord]) -> StreakResult {
        compute_streak(records, &habit.rule)
    }

    /// Progress report for a habit over `start..=end`
    pub fn habit_progress(
        &self,
        habit: &Habit,
        records: &[LogRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ProgressReport {
        compute_progress(records, start, end, &habit.rule)
    }

    /// Count Done records per weekday
    pub fn weekday_activity(&self, records: &[LogRecord]) -> WeekdayActivity {
        let mut counts = [0u32; 7];
        for record in records.iter().filter(|r| r.is_done()) {
            counts[record.date.weekday().num_days_from_sunday() as usize] += 1;
        }
        WeekdayActivity(counts)
    }

    /// Number of Done records
    pub fn total_completed(&self, records: &[LogRecord]) -> u32 {
        records.iter().filter(|r| r.is_done()).count() as u32
    }

    /// The habit with the greatest current streak as of `today`; the first one wins ties
    ///
    /// `records` must be each habit's full history. A run that ended before
    /// the latest due period counts as 0.
    pub fn best_streak(
        &self,
        habits: &[(Habit, Vec<LogRecord>)],
        today: NaiveDate,
    ) -> Option<BestStreak> {
        let mut best: Option<BestStreak> = None;

        for (habit, records) in habits {
            let current = StreakSnapshot::derive(habit.id.clone(), records, &habit.rule)
                .current_on(today, &habit.rule);
            let better = best.as_ref().map_or(true, |b| current > b.current_streak);
            if better {
                best = Some(BestStreak {
                    habit_id: habit.id.clone(),
                    title: habit.title.clone(),
                    current_streak: current,
                });
            }
        }

        best
    }

    /// Aggregate statistics for the given habits and their full histories
    ///
    /// Completions and weekday activity only count records in `start..=today`;
    /// the best streak looks at the whole history. Archived habits still count
    /// towards completions and activity but not towards `active_habits` or the
    /// best streak.
    pub fn stats(
        &self,
        habits: &[(Habit, Vec<LogRecord>)],
        start: NaiveDate,
        today: NaiveDate,
    ) -> StatsReport {
        let mut total_completed = 0;
        let mut activity = [0u32; 7];

        for (_, records) in habits {
            let windowed: Vec<LogRecord> = records
                .iter()
                .filter(|r| r.date >= start && r.date <= today)
                .cloned()
                .collect();
            total_completed += self.total_completed(&windowed);
            let WeekdayActivity(counts) = self.weekday_activity(&windowed);
            for (slot, count) in activity.iter_mut().zip(counts) {
                *slot += count;
            }
        }

        let active: Vec<(Habit, Vec<LogRecord>)> = habits
            .iter()
            .filter(|(habit, _)| !habit.archived)
            .cloned()
            .collect();

        StatsReport {
            total_completed,
            active_habits: active.len() as u32,
            weekday_activity: WeekdayActivity(activity),
            best_streak: self.best_streak(&active, today),
        }
    }
}
