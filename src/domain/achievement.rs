/// Streak milestones reached by a habit
///
/// An achievement is awarded once per habit and milestone, the first time the
/// habit's longest streak reaches that length.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::streak::period_label;
use super::types::{AchievementId, HabitId, RecurrenceRule};

/// Streak lengths that earn an achievement, ascending
pub const STREAK_MILESTONES: [u32; 7] = [3, 7, 14, 30, 50, 100, 365];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub habit_id: HabitId,
    /// Streak length that earned it
    pub milestone: u32,
    pub title: String,
    pub description: Option<String>,
    pub achieved_at: DateTime<Utc>,
}

impl Achievement {
    /// Build the achievement for reaching `milestone` on a habit
    pub fn for_milestone(
        habit_id: HabitId,
        habit_title: &str,
        rule: &RecurrenceRule,
        milestone: u32,
    ) -> Self {
        let unit = period_label(rule, 1);
        Self {
            id: AchievementId::new(),
            habit_id,
            milestone,
            title: format!("{}-{} streak", milestone, unit),
            description: Some(format!(
                "Kept '{}' going for {} {} in a row",
                habit_title,
                milestone,
                period_label(rule, milestone)
            )),
            achieved_at: Utc::now(),
        }
    }

    /// Restore an achievement read back from storage
    pub fn from_existing(
        id: AchievementId,
        habit_id: HabitId,
        milestone: u32,
        title: String,
        description: Option<String>,
        achieved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            habit_id,
            milestone,
            title,
            description,
            achieved_at,
        }
    }
}

/// Milestones a streak of `longest` has reached, ascending
pub fn milestones_reached(longest: u32) -> impl Iterator<Item = u32> {
    STREAK_MILESTONES.into_iter().take_while(move |m| *m <= longest)
}
