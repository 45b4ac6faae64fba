/// Property tests for the streak engine
use chrono::{Duration, NaiveDate};
use habit_streak_mcp::*;
use proptest::prelude::*;

fn rule_strategy() -> impl Strategy<Value = RecurrenceRule> {
    prop_oneof![
        Just(RecurrenceRule::Daily),
        Just(RecurrenceRule::Weekly),
        Just(RecurrenceRule::Monthly),
        Just(RecurrenceRule::MultipleTimesDaily),
        prop::collection::vec(0u8..7, 1..7)
            .prop_map(|days| RecurrenceRule::specific_days(&days).expect("indexes in range")),
    ]
}

fn status_strategy() -> impl Strategy<Value = LogStatus> {
    prop_oneof![
        3 => Just(LogStatus::Done),
        1 => Just(LogStatus::Partial),
        1 => Just(LogStatus::Skipped),
        1 => Just(LogStatus::Failed),
    ]
}

fn history_strategy() -> impl Strategy<Value = Vec<LogRecord>> {
    prop::collection::vec((0i64..400, status_strategy()), 0..60).prop_map(|entries| {
        let base = NaiveDate::from_ymd_opt(2023, 11, 1).expect("valid date");
        entries
            .into_iter()
            .map(|(offset, status)| LogRecord::with_status(base + Duration::days(offset), status))
            .collect()
    })
}

proptest! {
    #[test]
    fn longest_is_never_below_current(logs in history_strategy(), rule in rule_strategy()) {
        let streak = compute_streak(&logs, &rule);
        prop_assert!(streak.longest >= streak.current);
    }

    #[test]
    fn streak_ignores_record_order(logs in history_strategy(), rule in rule_strategy()) {
        let mut reversed = logs.clone();
        reversed.reverse();
        prop_assert_eq!(compute_streak(&logs, &rule), compute_streak(&reversed, &rule));
    }

    #[test]
    fn non_done_records_never_count(logs in history_strategy(), rule in rule_strategy()) {
        let done_only: Vec<LogRecord> = logs.iter().filter(|r| r.is_done()).cloned().collect();
        prop_assert_eq!(compute_streak(&logs, &rule), compute_streak(&done_only, &rule));
    }

    #[test]
    fn consecutive_days_form_one_run(n in 1u32..90) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let logs: Vec<LogRecord> = (0..n)
            .map(|i| LogRecord::with_status(start + Duration::days(i as i64), LogStatus::Done))
            .collect();

        let streak = compute_streak(&logs, &RecurrenceRule::Daily);
        prop_assert_eq!(streak, StreakResult { current: n, longest: n });
    }
}
