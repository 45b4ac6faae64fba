/// Basic unit tests to verify core functionality
use chrono::NaiveDate;
use habit_streak_mcp::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn done(y: i32, m: u32, d: u32) -> LogRecord {
    LogRecord::with_status(date(y, m, d), LogStatus::Done)
}

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    #[test]
    fn test_empty_history_for_every_rule() {
        let rules = [
            RecurrenceRule::Daily,
            RecurrenceRule::Weekly,
            RecurrenceRule::Monthly,
            RecurrenceRule::MultipleTimesDaily,
            RecurrenceRule::specific_days(&[1, 3, 5]).unwrap(),
        ];

        for rule in &rules {
            assert_eq!(compute_streak(&[], rule), StreakResult { current: 0, longest: 0 });
        }
    }

    #[test]
    fn test_broken_daily_run() {
        let logs = vec![
            done(2024, 3, 1),
            done(2024, 3, 2),
            done(2024, 3, 3),
            LogRecord::with_status(date(2024, 3, 4), LogStatus::Failed),
            done(2024, 3, 5),
        ];

        let streak = compute_streak(&logs, &RecurrenceRule::Daily);
        assert_eq!(streak, StreakResult { current: 1, longest: 3 });
    }

    #[test]
    fn test_four_consecutive_weeks() {
        let logs = vec![done(2024, 3, 4), done(2024, 3, 11), done(2024, 3, 18), done(2024, 3, 25)];

        let streak = compute_streak(&logs, &RecurrenceRule::Weekly);
        assert_eq!(streak, StreakResult { current: 4, longest: 4 });
    }

    #[test]
    fn test_duplicate_dates_count_once_for_streak_twice_for_progress() {
        let logs = vec![done(2024, 3, 1), done(2024, 3, 1), done(2024, 3, 2)];

        let streak = compute_streak(&logs, &RecurrenceRule::MultipleTimesDaily);
        assert_eq!(streak.current, 2);

        let report = compute_progress(&logs, date(2024, 3, 1), date(2024, 3, 2), &RecurrenceRule::MultipleTimesDaily);
        assert_eq!(report.completed, 3);
        assert_eq!(report.expected, 2);
        assert_eq!(report.percentage, 150);
    }

    #[test]
    fn test_monthly_progress_over_a_quarter() {
        let logs = vec![done(2024, 1, 10), done(2024, 3, 20)];

        let report = compute_progress(&logs, date(2024, 1, 1), date(2024, 3, 31), &RecurrenceRule::Monthly);
        assert_eq!(report.expected, 3);
        assert_eq!(report.completed, 2);
        assert_eq!(report.percentage, 67);
    }

    #[test]
    fn test_single_day_without_logs() {
        let day = date(2024, 3, 1);
        let report = compute_progress(&[], day, day, &RecurrenceRule::Daily);

        assert_eq!(report.expected, 1);
        assert_eq!(report.completed, 0);
        assert_eq!(report.percentage, 0);
    }

    #[test]
    fn test_habit_creation_validates_input() {
        let habit = Habit::new("  Read  ".to_string(), RecurrenceRule::Daily, Some(20.0), Some("pages".to_string()), false)
            .unwrap();
        assert_eq!(habit.title, "Read");
        assert_eq!(habit.target_display().as_deref(), Some("20 pages"));

        assert!(Habit::new("".to_string(), RecurrenceRule::Daily, None, None, false).is_err());
        assert!(RecurrenceRule::parse("specific_days", &[]).is_err());
    }
}
