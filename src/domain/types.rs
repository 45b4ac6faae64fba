/// Core types and enums used throughout the domain layer
///
/// This module defines the ID types, the log status and the recurrence rule
/// that Habit, HabitLog and the streak engine share.

use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, Weekday, Datelike};
use uuid::Uuid;

use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// This is a wrapper around UUID to provide type safety - you can't accidentally
/// pass a habit ID where a log ID is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a habit ID from a string (useful for database loading)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HabitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a single log row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogId(pub Uuid);

impl LogId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for LogId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an achievement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AchievementId(pub Uuid);

impl AchievementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for AchievementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AchievementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome recorded for a habit on a given day
///
/// Only `Done` counts towards streaks and progress. The other statuses are
/// kept for the user's history but are invisible to the streak engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogStatus {
    Done,
    Partial,
    Skipped,
    Failed,
}

impl LogStatus {
    /// Storage tag for this status
    pub fn as_tag(&self) -> &'static str {
        match self {
            LogStatus::Done => "DONE",
            LogStatus::Partial => "PARTIAL",
            LogStatus::Skipped => "SKIPPED",
            LogStatus::Failed => "FAILED",
        }
    }

    /// Parse a status tag, accepting any letter case
    pub fn parse(tag: &str) -> Result<Self, DomainError> {
        match tag.trim().to_uppercase().as_str() {
            "DONE" => Ok(LogStatus::Done),
            "PARTIAL" => Ok(LogStatus::Partial),
            "SKIPPED" => Ok(LogStatus::Skipped),
            "FAILED" => Ok(LogStatus::Failed),
            other => Err(DomainError::InvalidValue {
                message: format!(
                    "Invalid status '{}'. Valid options: done, partial, skipped, failed",
                    other.to_lowercase()
                ),
            }),
        }
    }
}

/// How often a habit is expected to be performed
///
/// The rule decides which completions count as "adjacent" when the streak
/// engine walks a habit's history, and how many occurrences a date range is
/// expected to contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrenceRule {
    /// Once every calendar day
    Daily,
    /// Once per ISO week, on any weekday
    Weekly,
    /// Once per calendar month
    Monthly,
    /// On the listed weekdays only. An empty list matches no day.
    SpecificDaysOfWeek(Vec<Weekday>),
    /// Several times a day; streaks still count calendar days
    MultipleTimesDaily,
}

impl RecurrenceRule {
    pub const DAILY_TAG: &'static str = "DAILY";
    pub const WEEKLY_TAG: &'static str = "WEEKLY";
    pub const MONTHLY_TAG: &'static str = "MONTHLY";
    pub const SPECIFIC_DAYS_TAG: &'static str = "SPECIFIC_DAYS";
    pub const MULTIPLE_TIMES_DAILY_TAG: &'static str = "MULTIPLE_TIMES_DAILY";

    /// Build a weekday rule from day indexes (0 = Sunday .. 6 = Saturday)
    ///
    /// Duplicates are removed and days are kept in Sunday-first order so that
    /// two rules naming the same days compare equal.
    pub fn specific_days(days: &[u8]) -> Result<Self, DomainError> {
        let mut weekdays = Vec::with_capacity(days.len());
        for &index in days {
            let weekday = weekday_from_index(index).ok_or_else(|| {
                DomainError::InvalidRule(format!("Weekday index must be 0-6, got {}", index))
            })?;
            weekdays.push(weekday);
        }
        Ok(RecurrenceRule::SpecificDaysOfWeek(normalize_weekdays(weekdays)))
    }

    /// Parse user input into a rule, rejecting unknown tags
    pub fn parse(tag: &str, days: &[u8]) -> Result<Self, DomainError> {
        let normalized = tag.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            Self::DAILY_TAG => Ok(RecurrenceRule::Daily),
            Self::WEEKLY_TAG => Ok(RecurrenceRule::Weekly),
            Self::MONTHLY_TAG => Ok(RecurrenceRule::Monthly),
            Self::SPECIFIC_DAYS_TAG | "SPECIFIC_DAYS_OF_WEEK" => Self::specific_days(days),
            Self::MULTIPLE_TIMES_DAILY_TAG => Ok(RecurrenceRule::MultipleTimesDaily),
            _ => Err(DomainError::InvalidRule(format!(
                "Invalid frequency '{}'. Valid options: daily, weekly, monthly, specific_days, multiple_times_daily",
                tag
            ))),
        }
    }

    /// Rebuild a rule from its stored parts
    ///
    /// Unlike `parse`, an unrecognized tag falls back to `Daily` so that a
    /// habit written by a newer schema still produces statistics.
    pub fn from_stored(tag: &str, days: &[u8]) -> Self {
        match Self::parse(tag, days) {
            Ok(rule) => rule,
            Err(_) if tag.eq_ignore_ascii_case(Self::SPECIFIC_DAYS_TAG) => {
                // Keep whatever weekday indexes are valid
                let valid: Vec<u8> = days.iter().copied().filter(|d| *d <= 6).collect();
                Self::specific_days(&valid).unwrap_or(RecurrenceRule::SpecificDaysOfWeek(Vec::new()))
            }
            Err(_) => {
                tracing::warn!("Unknown recurrence tag '{}', treating as daily", tag);
                RecurrenceRule::Daily
            }
        }
    }

    /// Storage tag for this rule
    pub fn tag(&self) -> &'static str {
        match self {
            RecurrenceRule::Daily => Self::DAILY_TAG,
            RecurrenceRule::Weekly => Self::WEEKLY_TAG,
            RecurrenceRule::Monthly => Self::MONTHLY_TAG,
            RecurrenceRule::SpecificDaysOfWeek(_) => Self::SPECIFIC_DAYS_TAG,
            RecurrenceRule::MultipleTimesDaily => Self::MULTIPLE_TIMES_DAILY_TAG,
        }
    }

    /// Weekday indexes (0 = Sunday) carried by the rule; empty for other variants
    pub fn day_indexes(&self) -> Vec<u8> {
        match self {
            RecurrenceRule::SpecificDaysOfWeek(days) => {
                days.iter().map(|d| d.num_days_from_sunday() as u8).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Validate that a rule is meaningful for a new or edited habit
    pub fn validate(&self) -> Result<(), DomainError> {
        if let RecurrenceRule::SpecificDaysOfWeek(days) = self {
            if days.is_empty() {
                return Err(DomainError::InvalidRule(
                    "Specific days frequency must name at least one weekday".to_string()
                ));
            }
        }
        Ok(())
    }

    /// Check whether the habit is expected to be logged on a given date
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        match self {
            RecurrenceRule::Daily | RecurrenceRule::MultipleTimesDaily => true,
            RecurrenceRule::Weekly => date.weekday() == Weekday::Mon,
            RecurrenceRule::Monthly => date.day() == 1,
            RecurrenceRule::SpecificDaysOfWeek(days) => days.contains(&date.weekday()),
        }
    }

    /// Human readable description of the rule
    pub fn display_name(&self) -> String {
        match self {
            RecurrenceRule::Daily => "Daily".to_string(),
            RecurrenceRule::Weekly => "Weekly".to_string(),
            RecurrenceRule::Monthly => "Monthly".to_string(),
            RecurrenceRule::MultipleTimesDaily => "Multiple times daily".to_string(),
            RecurrenceRule::SpecificDaysOfWeek(days) if days.is_empty() => {
                "Specific days".to_string()
            }
            RecurrenceRule::SpecificDaysOfWeek(days) => normalize_weekdays(days.clone())
                .iter()
                .map(|d| weekday_name(*d))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Convert a Sunday-based index (0..=6) into a weekday
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Full English name of a weekday
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

fn normalize_weekdays(mut days: Vec<Weekday>) -> Vec<Weekday> {
    days.sort_by_key(|d| d.num_days_from_sunday());
    days.dedup();
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_rules() {
        assert_eq!(RecurrenceRule::parse("daily", &[]).unwrap(), RecurrenceRule::Daily);
        assert_eq!(RecurrenceRule::parse("Weekly", &[]).unwrap(), RecurrenceRule::Weekly);
        assert_eq!(
            RecurrenceRule::parse("multiple times daily", &[]).unwrap(),
            RecurrenceRule::MultipleTimesDaily
        );
        assert_eq!(
            RecurrenceRule::parse("specific_days", &[5, 1, 1]).unwrap(),
            RecurrenceRule::SpecificDaysOfWeek(vec![Weekday::Mon, Weekday::Fri])
        );
        assert!(RecurrenceRule::parse("fortnightly", &[]).is_err());
        assert!(RecurrenceRule::parse("specific_days", &[7]).is_err());
    }

    #[test]
    fn test_unknown_stored_tag_falls_back_to_daily() {
        assert_eq!(RecurrenceRule::from_stored("FORTNIGHTLY", &[]), RecurrenceRule::Daily);
        assert_eq!(
            RecurrenceRule::from_stored("SPECIFIC_DAYS", &[2, 9]),
            RecurrenceRule::SpecificDaysOfWeek(vec![Weekday::Tue])
        );
    }

    #[test]
    fn test_stored_parts_round_trip() {
        let rule = RecurrenceRule::specific_days(&[0, 3]).unwrap();
        let restored = RecurrenceRule::from_stored(rule.tag(), &rule.day_indexes());
        assert_eq!(rule, restored);
    }

    #[test]
    fn test_empty_weekday_set_is_degenerate() {
        let rule = RecurrenceRule::SpecificDaysOfWeek(Vec::new());
        assert!(rule.validate().is_err());
        assert!(!rule.is_due_on(date(2024, 3, 4)));
        assert_eq!(rule.display_name(), "Specific days");
    }

    #[test]
    fn test_is_due_on() {
        // 2024-03-04 is a Monday
        let monday = date(2024, 3, 4);
        let tuesday = date(2024, 3, 5);

        assert!(RecurrenceRule::Daily.is_due_on(tuesday));
        assert!(RecurrenceRule::Weekly.is_due_on(monday));
        assert!(!RecurrenceRule::Weekly.is_due_on(tuesday));
        assert!(RecurrenceRule::Monthly.is_due_on(date(2024, 3, 1)));
        assert!(!RecurrenceRule::Monthly.is_due_on(monday));

        let rule = RecurrenceRule::specific_days(&[2]).unwrap();
        assert!(rule.is_due_on(tuesday));
        assert!(!rule.is_due_on(monday));
    }

    #[test]
    fn test_display_name_orders_days_from_sunday() {
        let rule = RecurrenceRule::specific_days(&[5, 0, 3]).unwrap();
        assert_eq!(rule.display_name(), "Sunday, Wednesday, Friday");
        assert_eq!(RecurrenceRule::MultipleTimesDaily.display_name(), "Multiple times daily");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(LogStatus::parse("done").unwrap(), LogStatus::Done);
        assert_eq!(LogStatus::parse(" Skipped ").unwrap(), LogStatus::Skipped);
        assert!(LogStatus::parse("finished").is_err());
        assert_eq!(LogStatus::Failed.as_tag(), "FAILED");
    }
}
