/// Progress reports over a date range
///
/// The progress half of the streak engine: how many completions a range holds
/// versus how many occurrences the recurrence rule expects in it.

use serde::{Deserialize, Serialize};
use chrono::{Datelike, Months, NaiveDate};
use crate::domain::{compute_streak, LogRecord, RecurrenceRule, StreakResult};

/// Completed versus expected occurrences for one date range
///
/// `completed` may exceed `expected` (several completions per week, or a
/// multiple-times-daily habit), so `percentage` can go above 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// `Done` records dated inside the range, duplicates included
    pub completed: u32,
    /// Occurrences the rule expects inside the range
    pub expected: u32,
    /// `round(100 * completed / expected)`, or 0 when nothing is expected
    pub percentage: u32,
    /// Streak over the whole history passed in, not just the range
    pub streak: StreakResult,
}

/// Build a progress report for `start..=end`
///
/// The range must satisfy `start <= end`; a reversed range is treated as
/// expecting nothing. The streak is computed from every record in `logs`,
/// while the completion count only looks inside the range.
pub fn compute_progress(
    logs: &[LogRecord],
    start: NaiveDate,
    end: NaiveDate,
    rule: &RecurrenceRule,
) -> ProgressReport {
    let expected = expected_occurrences(start, end, rule);

    let completed = logs
        .iter()
        .filter(|record| record.is_done() && record.date >= start && record.date <= end)
        .count() as u32;

    let percentage = if expected > 0 {
        (100.0 * completed as f64 / expected as f64).round() as u32
    } else {
        0
    };

    ProgressReport {
        completed,
        expected,
        percentage,
        streak: compute_streak(logs, rule),
    }
}

/// Number of occurrences a rule expects between `start` and `end` inclusive
///
/// Weekly and monthly rules round a partial final period up. Specific-days
/// rules are approximated by the daily count: every calendar day in range is
/// expected, not just the selected weekdays.
pub fn expected_occurrences(start: NaiveDate, end: NaiveDate, rule: &RecurrenceRule) -> u32 {
    let days = (end - start).num_days();
    if days < 0 {
        return 0;
    }

    match rule {
        RecurrenceRule::Weekly => (days as f64 / 7.0).ceil() as u32,
        RecurrenceRule::Monthly => fractional_months(start, end).ceil() as u32,
        RecurrenceRule::Daily
        | RecurrenceRule::MultipleTimesDaily
        | RecurrenceRule::SpecificDaysOfWeek(_) => days as u32 + 1,
    }
}

/// Real-valued number of calendar months from `start` to `end`
///
/// Whole months are counted by calendar (Jan 15 -> Mar 15 is exactly 2); the
/// remainder is the fraction of the following month-long segment covered.
fn fractional_months(start: NaiveDate, end: NaiveDate) -> f64 {
    if end <= start {
        return 0.0;
    }

    calendar_months(start, end).unwrap_or_else(|| {
        // Only reachable near the limits of NaiveDate
        (end - start).num_days() as f64 / 30.44
    })
}

fn calendar_months(start: NaiveDate, end: NaiveDate) -> Option<f64> {
    let mut whole = (end.year() - start.year()) as i64 * 12
        + end.month() as i64
        - start.month() as i64;

    let anchor_at = |months: i64| start.checked_add_months(Months::new(months as u32));

    // A later day-of-month in `start` means the last month is not complete yet
    while whole > 0 && anchor_at(whole)? > end {
        whole -= 1;
    }

    let anchor = anchor_at(whole)?;
    let next = anchor_at(whole + 1)?;
    let covered = (end - anchor).num_days() as f64;
    let segment = (next - anchor).num_days() as f64;

    Some(whole as f64 + covered / segment)
}
