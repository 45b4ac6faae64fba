/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit data. Rows are read column by column into `HabitRow`
/// / `LogRow` first, then mapped onto the domain; content that does not map
/// is reported as `StorageError::CorruptRow`.

use std::path::Path;
use rusqlite::{params, Connection, OptionalExtension, Row};
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    Achievement, AchievementId, Habit, HabitId, HabitLog, LogId, LogRecord, LogStatus,
    RecurrenceRule, StreakSnapshot,
};
use crate::storage::{migrations, HabitStorage, StorageError};

const HABIT_COLUMNS: &str =
    "id, title, frequency, days_of_week, target_quantity, unit, allow_multiple_logs, created_at, archived";

const LOG_COLUMNS: &str = "id, habit_id, log_date, status, quantity, note, inserted_at";

const ACHIEVEMENT_COLUMNS: &str = "id, habit_id, milestone, title, description, achieved_at";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStorage trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database file and bring its schema up to date
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::with_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {}", db_path.display());
        Ok(storage)
    }

    /// Open a private in-memory database, mostly useful for tests
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        // Cascading deletes of logs and streaks rely on this
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    fn get_log(&self, log_id: &LogId) -> Result<Option<HabitLog>, StorageError> {
        let sql = format!("SELECT {} FROM habit_logs WHERE id = ?1", LOG_COLUMNS);
        self.conn
            .query_row(&sql, params![log_id.to_string()], LogRow::read)
            .optional()?
            .map(LogRow::into_log)
            .transpose()
    }

    fn insert_log(&self, log: &HabitLog) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO habit_logs (id, habit_id, log_date, status, quantity, note, inserted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                log.id.to_string(),
                log.habit_id.to_string(),
                log.record.date,
                log.record.status.as_tag(),
                log.record.quantity,
                log.record.note,
                log.inserted_at
            ],
        )?;
        Ok(())
    }
}

/// A `habits` row as stored, before mapping onto the domain
struct HabitRow {
    id: String,
    title: String,
    frequency: String,
    days_of_week: String,
    target_quantity: Option<f64>,
    unit: Option<String>,
    allow_multiple_logs: bool,
    created_at: DateTime<Utc>,
    archived: bool,
}

impl HabitRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            frequency: row.get(2)?,
            days_of_week: row.get(3)?,
            target_quantity: row.get(4)?,
            unit: row.get(5)?,
            allow_multiple_logs: row.get(6)?,
            created_at: row.get(7)?,
            archived: row.get(8)?,
        })
    }

    fn into_habit(self) -> Result<Habit, StorageError> {
        let id = HabitId::from_string(&self.id)
            .map_err(|_| corrupt("habits", format!("invalid id '{}'", self.id)))?;
        let days: Vec<u8> = serde_json::from_str(&self.days_of_week).map_err(|_| {
            corrupt("habits", format!("invalid days_of_week '{}' for habit {}", self.days_of_week, id))
        })?;

        Ok(Habit::from_existing(
            id,
            self.title,
            RecurrenceRule::from_stored(&self.frequency, &days),
            self.target_quantity,
            self.unit,
            self.allow_multiple_logs,
            self.created_at,
            self.archived,
        ))
    }
}

/// A `habit_logs` row as stored
struct LogRow {
    id: String,
    habit_id: String,
    log_date: NaiveDate,
    status: String,
    quantity: Option<f64>,
    note: Option<String>,
    inserted_at: DateTime<Utc>,
}

impl LogRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            habit_id: row.get(1)?,
            log_date: row.get(2)?,
            status: row.get(3)?,
            quantity: row.get(4)?,
            note: row.get(5)?,
            inserted_at: row.get(6)?,
        })
    }

    fn into_log(self) -> Result<HabitLog, StorageError> {
        let id = LogId::from_string(&self.id)
            .map_err(|_| corrupt("habit_logs", format!("invalid id '{}'", self.id)))?;
        let habit_id = HabitId::from_string(&self.habit_id)
            .map_err(|_| corrupt("habit_logs", format!("invalid habit_id '{}' on log {}", self.habit_id, id)))?;
        let status = LogStatus::parse(&self.status)
            .map_err(|_| corrupt("habit_logs", format!("invalid status '{}' on log {}", self.status, id)))?;

        Ok(HabitLog::from_existing(
            id,
            habit_id,
            self.inserted_at,
            LogRecord {
                date: self.log_date,
                status,
                quantity: self.quantity,
                note: self.note,
            },
        ))
    }
}

/// An `achievements` row as stored
struct AchievementRow {
    id: String,
    habit_id: String,
    milestone: u32,
    title: String,
    description: Option<String>,
    achieved_at: DateTime<Utc>,
}

impl AchievementRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            habit_id: row.get(1)?,
            milestone: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            achieved_at: row.get(5)?,
        })
    }

    fn into_achievement(self) -> Result<Achievement, StorageError> {
        let id = AchievementId::from_string(&self.id)
            .map_err(|_| corrupt("achievements", format!("invalid id '{}'", self.id)))?;
        let habit_id = HabitId::from_string(&self.habit_id).map_err(|_| {
            corrupt("achievements", format!("invalid habit_id '{}' on achievement {}", self.habit_id, id))
        })?;

        Ok(Achievement::from_existing(
            id,
            habit_id,
            self.milestone,
            self.title,
            self.description,
            self.achieved_at,
        ))
    }
}

fn corrupt(table: &'static str, message: String) -> StorageError {
    tracing::warn!("Corrupt row in {}: {}", table, message);
    StorageError::CorruptRow { table, message }
}

impl HabitStorage for SqliteStorage {
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let days_json = serde_json::to_string(&habit.rule.day_indexes())?;

        self.conn.execute(
            "INSERT INTO habits (
                id, title, frequency, days_of_week, target_quantity, unit,
                allow_multiple_logs, created_at, archived
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                habit.id.to_string(),
                habit.title,
                habit.rule.tag(),
                days_json,
                habit.target_quantity,
                habit.unit,
                habit.allow_multiple_logs,
                habit.created_at,
                habit.archived
            ],
        )?;

        tracing::debug!("Created habit: {} ({})", habit.title, habit.id);
        Ok(())
    }

    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let sql = format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS);

        self.conn
            .query_row(&sql, params![habit_id.to_string()], HabitRow::read)
            .optional()?
            .ok_or_else(|| StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            })?
            .into_habit()
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let days_json = serde_json::to_string(&habit.rule.day_indexes())?;

        let rows_affected = self.conn.execute(
            "UPDATE habits SET
                title = ?2,
                frequency = ?3,
                days_of_week = ?4,
                target_quantity = ?5,
                unit = ?6,
                allow_multiple_logs = ?7,
                archived = ?8
             WHERE id = ?1",
            params![
                habit.id.to_string(),
                habit.title,
                habit.rule.tag(),
                days_json,
                habit.target_quantity,
                habit.unit,
                habit.allow_multiple_logs,
                habit.archived
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tracing::debug!("Updated habit: {} ({})", habit.title, habit.id);
        Ok(())
    }

    fn archive_habit(&self, habit_id: &HabitId, archived: bool) -> Result<Habit, StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habits SET archived = ?2 WHERE id = ?1",
            params![habit_id.to_string(), archived],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Set archived={} on habit {}", archived, habit_id);
        self.get_habit(habit_id)
    }

    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1",
            params![habit_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>, StorageError> {
        let mut sql = format!("SELECT {} FROM habits", HABIT_COLUMNS);

        if !include_archived {
            sql.push_str(" WHERE archived = 0");
        }

        sql.push_str(" ORDER BY created_at DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], HabitRow::read)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(HabitRow::into_habit).collect()
    }

    fn upsert_log(&self, habit: &Habit, record: &LogRecord) -> Result<HabitLog, StorageError> {
        if !habit.allow_multiple_logs {
            if let Some(existing) = self.get_log_by_date(&habit.id, record.date)? {
                self.conn.execute(
                    "UPDATE habit_logs SET status = ?2, quantity = ?3, note = ?4 WHERE id = ?1",
                    params![
                        existing.id.to_string(),
                        record.status.as_tag(),
                        record.quantity,
                        record.note
                    ],
                )?;

                tracing::debug!("Updated log {} for habit {} on {}", existing.id, habit.id, record.date);
                return Ok(HabitLog::from_existing(
                    existing.id,
                    existing.habit_id,
                    existing.inserted_at,
                    record.clone(),
                ));
            }
        }

        let log = HabitLog::new(habit.id.clone(), record.clone());
        self.insert_log(&log)?;

        tracing::debug!("Created log {} for habit {} on {}", log.id, habit.id, record.date);
        Ok(log)
    }

    fn get_log_by_date(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
    ) -> Result<Option<HabitLog>, StorageError> {
        let sql = format!(
            "SELECT {} FROM habit_logs WHERE habit_id = ?1 AND log_date = ?2
             ORDER BY inserted_at DESC LIMIT 1",
            LOG_COLUMNS
        );

        self.conn
            .query_row(&sql, params![habit_id.to_string(), date], LogRow::read)
            .optional()?
            .map(LogRow::into_log)
            .transpose()
    }

    fn get_logs(
        &self,
        habit_id: &HabitId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<HabitLog>, StorageError> {
        let sql = format!(
            "SELECT {} FROM habit_logs
             WHERE habit_id = ?1
               AND (?2 IS NULL OR log_date >= ?2)
               AND (?3 IS NULL OR log_date <= ?3)
             ORDER BY log_date DESC, inserted_at DESC",
            LOG_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![habit_id.to_string(), start_date, end_date], LogRow::read)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(LogRow::into_log).collect()
    }

    fn delete_log(&self, log_id: &LogId) -> Result<HabitLog, StorageError> {
        let log = self.get_log(log_id)?.ok_or_else(|| StorageError::LogNotFound {
            log_id: log_id.to_string(),
        })?;

        self.conn.execute(
            "DELETE FROM habit_logs WHERE id = ?1",
            params![log_id.to_string()],
        )?;

        tracing::debug!("Deleted log {} of habit {}", log_id, log.habit_id);
        Ok(log)
    }

    fn save_streak(&self, snapshot: &StreakSnapshot) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO habit_streaks (
                habit_id, current_streak, longest_streak, last_completion_date, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (habit_id) DO UPDATE SET
                current_streak = excluded.current_streak,
                longest_streak = excluded.longest_streak,
                last_completion_date = excluded.last_completion_date,
                updated_at = excluded.updated_at",
            params![
                snapshot.habit_id.to_string(),
                snapshot.current_streak,
                snapshot.longest_streak,
                snapshot.last_completion_date,
                Utc::now()
            ],
        )?;

        tracing::debug!("Saved streak for habit: {}", snapshot.habit_id);
        Ok(())
    }

    fn get_streak(&self, habit_id: &HabitId) -> Result<StreakSnapshot, StorageError> {
        let snapshot = self
            .conn
            .query_row(
                "SELECT current_streak, longest_streak, last_completion_date
                 FROM habit_streaks WHERE habit_id = ?1",
                params![habit_id.to_string()],
                |row| {
                    Ok(StreakSnapshot {
                        habit_id: habit_id.clone(),
                        current_streak: row.get(0)?,
                        longest_streak: row.get(1)?,
                        last_completion_date: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(snapshot.unwrap_or_else(|| StreakSnapshot::new(habit_id.clone())))
    }

    fn record_achievement(&self, achievement: &Achievement) -> Result<bool, StorageError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO achievements (
                id, habit_id, milestone, title, description, achieved_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                achievement.id.to_string(),
                achievement.habit_id.to_string(),
                achievement.milestone,
                achievement.title,
                achievement.description,
                achievement.achieved_at
            ],
        )?;

        if inserted > 0 {
            tracing::info!(
                "Habit {} reached the {} milestone",
                achievement.habit_id,
                achievement.milestone
            );
        }
        Ok(inserted > 0)
    }

    fn list_achievements(&self, habit_id: Option<&HabitId>) -> Result<Vec<Achievement>, StorageError> {
        let sql = format!(
            "SELECT {} FROM achievements
             WHERE ?1 IS NULL OR habit_id = ?1
             ORDER BY achieved_at DESC, milestone DESC",
            ACHIEVEMENT_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![habit_id.map(|id| id.to_string())], AchievementRow::read)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(AchievementRow::into_achievement).collect()
    }
}
