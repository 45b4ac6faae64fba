/// Streak calculation
///
/// This module holds the streak half of the streak engine: a pure function
/// from a habit's log history and recurrence rule to its current and longest
/// streak, plus the persisted snapshot derived from it.
///
/// Streaks are always derived from the full history. Nothing here patches a
/// stored counter incrementally.

use serde::{Deserialize, Serialize};
use chrono::{Datelike, Duration, NaiveDate};
use crate::domain::{HabitId, LogRecord, RecurrenceRule};

/// Current and longest run of adjacent completions
///
/// `longest >= current` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    /// Length of the run that ends at the most recent completion
    pub current: u32,
    /// Longest run found anywhere in the history
    pub longest: u32,
}

/// Compute the streak for a habit from its log history
///
/// Only `Done` records take part: any other status neither breaks nor extends
/// a run. Records may arrive in any order. Several `Done` records on the same
/// calendar day count as a single occurrence.
///
/// `current` is anchored at the most recent `Done` date, whatever that date
/// is. Whether that run is still open today is up to the caller (see
/// `StreakSnapshot::is_active_on`).
pub fn compute_streak(logs: &[LogRecord], rule: &RecurrenceRule) -> StreakResult {
    let mut dates: Vec<NaiveDate> = logs
        .iter()
        .filter(|record| record.is_done())
        .map(|record| record.date)
        .collect();

    if dates.is_empty() {
        return StreakResult::default();
    }

    // Newest first, one entry per calendar day
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();

    let mut run: u32 = 1;
    let mut longest: u32 = 0;
    let mut current: Option<u32> = None;

    for pair in dates.windows(2) {
        let (newer, older) = (pair[0], pair[1]);

        if is_adjacent(newer, older, rule) {
            run += 1;
        } else {
            // The first break closes the run anchored at the latest completion
            current.get_or_insert(run);
            longest = longest.max(run);
            run = 1;
        }
    }

    longest = longest.max(run);
    let current = current.unwrap_or(run);

    StreakResult {
        current,
        longest: longest.max(current),
    }
}

/// Decide whether two completion dates belong to the same run
///
/// `newer` must not be earlier than `older`.
///
/// - Daily, multiple-times-daily and specific-days rules tolerate a gap of at
///   most one calendar day. Specific-days rules do not look at the weekday set.
/// - Weekly rules accept the same ISO week or the ISO week right before,
///   whatever the weekday.
/// - Monthly rules accept the same calendar month or the month right before.
pub fn is_adjacent(newer: NaiveDate, older: NaiveDate, rule: &RecurrenceRule) -> bool {
    match rule {
        RecurrenceRule::Weekly => {
            let days = (iso_week_start(newer) - iso_week_start(older)).num_days();
            days == 0 || days == 7
        }
        RecurrenceRule::Monthly => {
            let months = month_index(newer) - month_index(older);
            months == 0 || months == 1
        }
        RecurrenceRule::Daily
        | RecurrenceRule::MultipleTimesDaily
        | RecurrenceRule::SpecificDaysOfWeek(_) => (newer - older).num_days() <= 1,
    }
}

/// Monday of the ISO week containing `date`
fn iso_week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Months since year 0, so consecutive months differ by exactly one
fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// Materialized streak for a habit, as persisted by the storage layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakSnapshot {
    /// Which habit this streak data is for
    pub habit_id: HabitId,
    /// Current run of adjacent completions
    pub current_streak: u32,
    /// Best run ever achieved for this habit
    pub longest_streak: u32,
    /// Latest day marked done (None if never completed)
    pub last_completion_date: Option<NaiveDate>,
}

impl StreakSnapshot {
    /// An empty snapshot for a habit that has never been completed
    pub fn new(habit_id: HabitId) -> Self {
        Self {
            habit_id,
            current_streak: 0,
            longest_streak: 0,
            last_completion_date: None,
        }
    }

    /// Derive the snapshot from a habit's complete history
    pub fn derive(habit_id: HabitId, logs: &[LogRecord], rule: &RecurrenceRule) -> Self {
        let streak = compute_streak(logs, rule);
        let last_completion_date = logs
            .iter()
            .filter(|record| record.is_done())
            .map(|record| record.date)
            .max();

        Self {
            habit_id,
            current_streak: streak.current,
            longest_streak: streak.longest,
            last_completion_date,
        }
    }

    /// Whether the current streak is still open on `today`
    ///
    /// A streak stays open while the latest completion is today (or later) or
    /// adjacent to today under the habit's rule.
    pub fn is_active_on(&self, today: NaiveDate, rule: &RecurrenceRule) -> bool {
        match self.last_completion_date {
            None => false,
            Some(last) if last >= today => true,
            Some(last) => is_adjacent(today, last, rule),
        }
    }

    /// The streak as it should be shown on `today`: zero once it went stale
    pub fn current_on(&self, today: NaiveDate, rule: &RecurrenceRule) -> u32 {
        if self.is_active_on(today, rule) {
            self.current_streak
        } else {
            0
        }
    }

    /// Get a motivational message based on current streak status
    pub fn motivational_message(&self, rule: &RecurrenceRule) -> String {
        let span = period_label(rule, self.current_streak);
        match self.current_streak {
            0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
            1 => format!("Great start! One {} down, keep the momentum going.", period_label(rule, 1)),
            2..=6 => format!("Nice work! {} {} in a row. You're building a strong habit.", self.current_streak, span),
            7..=13 => format!("Excellent! {} {} strong. You're in the groove now!", self.current_streak, span),
            14..=29 => format!("Amazing! {} {} straight. This is becoming second nature.", self.current_streak, span),
            30..=99 => format!("Incredible! {} {} of consistency. You're a habit master!", self.current_streak, span),
            _ => format!("Legendary! {} {} of unwavering commitment. You're an inspiration!", self.current_streak, span),
        }
    }
}

/// Unit a streak of `count` occurrences is measured in ("day", "weeks", ...)
pub fn period_label(rule: &RecurrenceRule, count: u32) -> &'static str {
    match (rule, count == 1) {
        (RecurrenceRule::Weekly, true) => "week",
        (RecurrenceRule::Weekly, false) => "weeks",
        (RecurrenceRule::Monthly, true) => "month",
        (RecurrenceRule::Monthly, false) => "months",
        (_, true) => "day",
        (_, false) => "days",
    }
}
