/// Storage and analytics against an on-disk database
use chrono::NaiveDate;
use habit_streak_mcp::*;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_database_persistence() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("habits.db");

        let habit_id = {
            let server = HabitStreakServer::new(db_path.clone())
                .await
                .expect("Failed to create first server");
            let habit = Habit::new("Stretch".to_string(), RecurrenceRule::Weekly, None, None, false).unwrap();
            server.storage().create_habit(&habit).unwrap();
            server
                .storage()
                .upsert_log(&habit, &LogRecord::with_status(date(2024, 3, 4), LogStatus::Done))
                .unwrap();
            habit.id
        };

        // A second server on the same file sees the habit and its log
        let server = HabitStreakServer::new(db_path)
            .await
            .expect("Failed to create second server");
        let habit = server.storage().get_habit(&habit_id).unwrap();
        assert_eq!(habit.rule, RecurrenceRule::Weekly);
        assert_eq!(server.storage().get_logs(&habit_id, None, None).unwrap().len(), 1);
    }

    #[test]
    fn test_storage_and_analytics_workflow() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let storage = SqliteStorage::new(dir.path().join("habits.db")).expect("Failed to create storage");
        let analytics = AnalyticsEngine::new();

        let habit = Habit::new("Journal".to_string(), RecurrenceRule::Daily, None, None, false).unwrap();
        storage.create_habit(&habit).unwrap();

        for day in [1, 2, 3, 5] {
            storage
                .upsert_log(&habit, &LogRecord::with_status(date(2024, 3, day), LogStatus::Done))
                .unwrap();
        }
        storage
            .upsert_log(&habit, &LogRecord::with_status(date(2024, 3, 4), LogStatus::Skipped))
            .unwrap();

        let records = records_of(&storage.get_logs(&habit.id, None, None).unwrap());
        let snapshot = StreakSnapshot::derive(habit.id.clone(), &records, &habit.rule);
        storage.save_streak(&snapshot).unwrap();

        let stored = storage.get_streak(&habit.id).unwrap();
        assert_eq!(stored.current_streak, 1);
        assert_eq!(stored.longest_streak, 3);
        assert_eq!(stored.last_completion_date, Some(date(2024, 3, 5)));

        let report = analytics.habit_progress(&habit, &records, date(2024, 3, 1), date(2024, 3, 7));
        assert_eq!((report.completed, report.expected, report.percentage), (4, 7, 57));
    }

    #[test]
    fn test_multiple_logs_per_day_are_kept() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let storage = SqliteStorage::new(dir.path().join("habits.db")).unwrap();

        let habit = Habit::new("Water".to_string(), RecurrenceRule::MultipleTimesDaily, None, None, true).unwrap();
        storage.create_habit(&habit).unwrap();
        for _ in 0..3 {
            storage
                .upsert_log(&habit, &LogRecord::with_status(date(2024, 3, 1), LogStatus::Done))
                .unwrap();
        }

        let records = records_of(&storage.get_logs(&habit.id, None, None).unwrap());
        assert_eq!(records.len(), 3);
        assert_eq!(compute_streak(&records, &habit.rule).current, 1);
    }
}
