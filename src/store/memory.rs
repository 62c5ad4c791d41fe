//! In-memory store

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{AchievementStore, CompletionStore, HabitStore, StoreError, StoreResult, UserStore};
use crate::domain::{Achievement, Habit, HabitCompletion, NewAchievement, User, UserId, UserUpdate};

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    habits: Vec<Habit>,
    completions: Vec<HabitCompletion>,
    achievements: Vec<Achievement>,
    user_updates: usize,
}

/// Store backed by process-local collections
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    /// Insert or replace a user row
    pub fn insert_user(&self, user: User) -> StoreResult<()> {
        self.lock()?.users.insert(user.id.clone(), user);
        Ok(())
    }

    /// Number of successful `update_user` calls so far
    pub fn user_update_count(&self) -> usize {
        self.lock().map(|inner| inner.user_updates).unwrap_or(0)
    }

    /// Number of stored achievement rows across all users
    pub fn achievement_count(&self) -> usize {
        self.lock().map(|inner| inner.achievements.len()).unwrap_or(0)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, user_id: &UserId) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.get(user_id).cloned())
    }

    async fn update_user(&self, user_id: &UserId, update: &UserUpdate) -> StoreResult<()> {
        let mut inner = self.lock()?;
        let user = inner
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?;
        user.apply(update);
        inner.user_updates += 1;
        Ok(())
    }
}

#[async_trait]
impl CompletionStore for MemoryStore {
    async fn get_completions_for_date(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> StoreResult<Vec<HabitCompletion>> {
        Ok(self
            .lock()?
            .completions
            .iter()
            .filter(|c| &c.user_id == user_id && c.completion_date == date)
            .cloned()
            .collect())
    }

    async fn upsert_completion(&self, completion: &HabitCompletion) -> StoreResult<HabitCompletion> {
        let mut inner = self.lock()?;
        if let Some(existing) = inner.completions.iter_mut().find(|c| c.same_slot(completion)) {
            // Row identity survives the upsert
            let id = existing.id.clone();
            *existing = HabitCompletion {
                id,
                ..completion.clone()
            };
            return Ok(existing.clone());
        }
        inner.completions.push(completion.clone());
        Ok(completion.clone())
    }

    async fn get_completion_history(&self, user_id: &UserId) -> StoreResult<Vec<HabitCompletion>> {
        let mut history: Vec<HabitCompletion> = self
            .lock()?
            .completions
            .iter()
            .filter(|c| &c.user_id == user_id)
            .cloned()
            .collect();
        history.sort_by_key(|c| c.completion_date);
        Ok(history)
    }
}

#[async_trait]
impl AchievementStore for MemoryStore {
    async fn get_achievements(&self, user_id: &UserId) -> StoreResult<Vec<Achievement>> {
        let mut earned: Vec<Achievement> = self
            .lock()?
            .achievements
            .iter()
            .filter(|a| &a.user_id == user_id)
            .cloned()
            .collect();
        earned.sort_by(|a, b| b.earned_at.cmp(&a.earned_at));
        Ok(earned)
    }

    async fn create_achievement(
        &self,
        achievement: &NewAchievement,
    ) -> StoreResult<(Achievement, bool)> {
        let mut inner = self.lock()?;
        if let Some(existing) = inner
            .achievements
            .iter()
            .find(|a| a.user_id == achievement.user_id && a.badge_type == achievement.badge_type)
        {
            return Ok((existing.clone(), false));
        }
        let created = achievement.clone().into_achievement();
        inner.achievements.push(created.clone());
        Ok((created, true))
    }
}

#[async_trait]
impl HabitStore for MemoryStore {
    async fn get_habits(&self, user_id: &UserId) -> StoreResult<Vec<Habit>> {
        let mut habits: Vec<Habit> = self
            .lock()?
            .habits
            .iter()
            .filter(|h| &h.user_id == user_id)
            .cloned()
            .collect();
        habits.sort_by_key(|h| h.order_index);
        Ok(habits)
    }

    async fn create_habit(&self, habit: &Habit) -> StoreResult<Habit> {
        let mut inner = self.lock()?;
        if inner.habits.iter().any(|h| h.id == habit.id) {
            return Err(StoreError::Backend(format!("habit {} already exists", habit.id)));
        }
        inner.habits.push(habit.clone());
        Ok(habit.clone())
    }
}
