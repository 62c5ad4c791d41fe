use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{HabitId, UserId};

/// One habit's state on one calendar day.
///
/// There is at most one completion per (habit, date); writes upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitCompletion {
    pub id: String,
    pub habit_id: HabitId,
    pub user_id: UserId,
    pub completion_date: NaiveDate,
    pub completed: bool,
    pub actual_minutes: Option<u32>,
    pub note: Option<String>,
    /// Set when `completed` flips to true
    pub completed_at: Option<DateTime<Utc>>,
}

impl HabitCompletion {
    pub fn new(user_id: UserId, habit_id: HabitId, completion_date: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            habit_id,
            user_id,
            completion_date,
            completed: false,
            actual_minutes: None,
            note: None,
            completed_at: None,
        }
    }

    /// Same (habit, date) slot
    pub fn same_slot(&self, other: &HabitCompletion) -> bool {
        self.habit_id == other.habit_id && self.completion_date == other.completion_date
    }
}

/// A user's request to mark a habit done or not done on a date
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionToggle {
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub completed: bool,
    pub actual_minutes: Option<u32>,
    pub note: Option<String>,
}

impl CompletionToggle {
    pub fn done(habit_id: HabitId, date: NaiveDate) -> Self {
        Self {
            habit_id,
            date,
            completed: true,
            actual_minutes: None,
            note: None,
        }
    }

    pub fn undone(habit_id: HabitId, date: NaiveDate) -> Self {
        Self {
            completed: false,
            ..Self::done(habit_id, date)
        }
    }

    /// Build the completion row to upsert
    pub fn into_completion(self, user_id: UserId, now: DateTime<Utc>) -> HabitCompletion {
        let mut completion = HabitCompletion::new(user_id, self.habit_id, self.date);
        completion.completed = self.completed;
        completion.actual_minutes = self.actual_minutes;
        completion.note = self.note;
        completion.completed_at = self.completed.then_some(now);
        completion
    }
}

/// True when at least one completion in the slice is marked completed
pub fn any_completed(completions: &[HabitCompletion]) -> bool {
    completions.iter().any(|c| c.completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_sets_completed_at_only_when_done() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let now = Utc::now();

        let done = CompletionToggle::done(HabitId::new("h1"), date)
            .into_completion(UserId::new("u1"), now);
        assert!(done.completed);
        assert_eq!(done.completed_at, Some(now));

        let undone = CompletionToggle::undone(HabitId::new("h1"), date)
            .into_completion(UserId::new("u1"), now);
        assert!(!undone.completed);
        assert!(undone.completed_at.is_none());
        assert!(done.same_slot(&undone));
    }
}
