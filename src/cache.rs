//! Client-side view of one user's day
//!
//! [`DayCache`] mirrors what the stores hold for a single user and date. It
//! is reloaded on every mount, takes optimistic writes while a toggle is in
//! flight, and reconciles with the stored rows on the next successful load.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::domain::{Habit, HabitCompletion, HabitId, User, UserId};
use crate::gamification::is_perfect_day;
use crate::store::Stores;

/// Snapshot of a user, their habits and one day's completions
#[derive(Debug, Clone)]
pub struct DayCache {
    user_id: UserId,
    date: NaiveDate,
    user: Option<User>,
    habits: Vec<Habit>,
    completions: Vec<HabitCompletion>,
    /// Optimistic rows not yet confirmed, with the row they replaced
    pending: HashMap<HabitId, Option<HabitCompletion>>,
    stale: bool,
    loaded_at: Option<DateTime<Utc>>,
}

impl DayCache {
    /// Empty cache; call [`DayCache::load`] before reading
    pub fn new(user_id: UserId, date: NaiveDate) -> Self {
        Self {
            user_id,
            date,
            user: None,
            habits: Vec::new(),
            completions: Vec::new(),
            pending: HashMap::new(),
            stale: true,
            loaded_at: None,
        }
    }

    /// Reload everything from the stores.
    ///
    /// Each part that fails to load keeps its previous snapshot and marks
    /// the cache stale. Returns `true` when every read succeeded.
    pub async fn load(&mut self, stores: &Stores) -> bool {
        let mut fresh = true;

        match stores.users.get_user(&self.user_id).await {
            Ok(Some(user)) => self.user = Some(user),
            Ok(None) => {
                warn!("User {} not found, keeping cached snapshot", self.user_id);
                fresh = false;
            }
            Err(e) => {
                warn!("Failed to load user {}: {}", self.user_id, e);
                fresh = false;
            }
        }

        match stores.habits.get_habits(&self.user_id).await {
            Ok(habits) => self.habits = habits,
            Err(e) => {
                warn!("Failed to load habits for {}: {}", self.user_id, e);
                fresh = false;
            }
        }

        match stores
            .completions
            .get_completions_for_date(&self.user_id, self.date)
            .await
        {
            Ok(rows) => {
                if !self.pending.is_empty() {
                    debug!(
                        "Reconciling {} optimistic completion(s) for {}",
                        self.pending.len(),
                        self.date
                    );
                }
                self.completions = rows;
                self.pending.clear();
            }
            Err(e) => {
                warn!("Failed to load completions for {} on {}: {}", self.user_id, self.date, e);
                fresh = false;
            }
        }

        self.stale = !fresh;
        if fresh {
            self.loaded_at = Some(Utc::now());
        }
        fresh
    }

    /// Show `completion` before the write finishes. Ignored for another date.
    pub fn apply_optimistic(&mut self, completion: HabitCompletion) -> bool {
        if completion.completion_date != self.date {
            return false;
        }

        let previous = self.replace_row(completion.clone());
        self.pending
            .entry(completion.habit_id)
            .or_insert(previous);
        true
    }

    /// Swap the optimistic row for the one the store returned
    pub fn confirm(&mut self, stored: HabitCompletion) {
        if stored.completion_date != self.date {
            return;
        }
        self.pending.remove(&stored.habit_id);
        self.replace_row(stored);
    }

    /// Undo an optimistic row after its write failed
    pub fn rollback(&mut self, habit_id: &HabitId) {
        let Some(previous) = self.pending.remove(habit_id) else {
            return;
        };
        self.completions.retain(|c| &c.habit_id != habit_id);
        if let Some(row) = previous {
            self.completions.push(row);
        }
    }

    /// Move to another day. Completions are dropped until the next load.
    pub fn set_date(&mut self, date: NaiveDate) {
        if date == self.date {
            return;
        }
        self.date = date;
        self.completions.clear();
        self.pending.clear();
        self.stale = true;
    }

    /// Replace the cached user after a local gamification update
    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    fn replace_row(&mut self, row: HabitCompletion) -> Option<HabitCompletion> {
        match self.completions.iter_mut().find(|c| c.same_slot(&row)) {
            Some(existing) => Some(std::mem::replace(existing, row)),
            None => {
                self.completions.push(row);
                None
            }
        }
    }

    // Queries

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn active_habits(&self) -> impl Iterator<Item = &Habit> {
        self.habits.iter().filter(|h| h.is_active())
    }

    pub fn completions(&self) -> &[HabitCompletion] {
        &self.completions
    }

    pub fn completion_for(&self, habit_id: &HabitId) -> Option<&HabitCompletion> {
        self.completions.iter().find(|c| &c.habit_id == habit_id)
    }

    pub fn is_completed(&self, habit_id: &HabitId) -> bool {
        self.completion_for(habit_id).is_some_and(|c| c.completed)
    }

    /// Active habits completed on this day
    pub fn completed_count(&self) -> usize {
        self.active_habits()
            .filter(|h| self.is_completed(&h.id))
            .count()
    }

    pub fn is_perfect_day(&self) -> bool {
        is_perfect_day(&self.habits, &self.completions)
    }

    /// Some part of the last load failed, or no load has happened yet
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Optimistic rows are waiting for confirmation
    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::domain::{Category, CompletionToggle, UserUpdate};
    use crate::store::{
        CompletionStore, HabitStore, MemoryStore, StoreError, StoreResult, UserStore,
    };

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    async fn seeded() -> (Arc<MemoryStore>, Habit, Habit) {
        let store = Arc::new(MemoryStore::new());
        let user_id = UserId::new("u1");
        store.insert_user(User::new(user_id.clone(), None)).unwrap();
        let read = store
            .create_habit(&Habit::new(user_id.clone(), "Read", Category::new("📚", "Learning")))
            .await
            .unwrap();
        let walk = store
            .create_habit(&Habit::new(user_id, "Walk", Category::new("🚶", "Health")))
            .await
            .unwrap();
        (store, read, walk)
    }

    fn done(habit: &Habit) -> HabitCompletion {
        CompletionToggle::done(habit.id.clone(), day()).into_completion(habit.user_id.clone(), Utc::now())
    }

    #[tokio::test]
    async fn test_load_populates_snapshot() {
        let (store, read, _walk) = seeded().await;
        store.upsert_completion(&done(&read)).await.unwrap();

        let mut cache = DayCache::new(UserId::new("u1"), day());
        assert!(cache.is_stale());
        assert!(cache.load(&Stores::from_backend(store)).await);

        assert!(!cache.is_stale());
        assert_eq!(cache.habits().len(), 2);
        assert!(cache.is_completed(&read.id));
        assert_eq!(cache.completed_count(), 1);
        assert!(!cache.is_perfect_day());
    }

    #[tokio::test]
    async fn test_optimistic_then_reconcile() {
        let (store, read, walk) = seeded().await;
        let stores = Stores::from_backend(store.clone());
        let mut cache = DayCache::new(UserId::new("u1"), day());
        cache.load(&stores).await;

        cache.apply_optimistic(done(&read));
        cache.apply_optimistic(done(&walk));
        assert!(cache.is_dirty());
        assert!(cache.is_perfect_day());

        // only one write reaches the store
        let stored = store.upsert_completion(&done(&read)).await.unwrap();
        cache.confirm(stored.clone());
        assert!(cache.is_dirty());
        assert_eq!(cache.completion_for(&read.id).unwrap().id, stored.id);

        cache.load(&stores).await;
        assert!(!cache.is_dirty());
        assert!(cache.is_completed(&read.id));
        assert!(!cache.is_completed(&walk.id));
    }

    #[tokio::test]
    async fn test_rollback_restores_previous_row() {
        let (store, read, _walk) = seeded().await;
        let stored = store.upsert_completion(&done(&read)).await.unwrap();
        let mut cache = DayCache::new(UserId::new("u1"), day());
        cache.load(&Stores::from_backend(store)).await;

        let undo = CompletionToggle::undone(read.id.clone(), day())
            .into_completion(read.user_id.clone(), Utc::now());
        cache.apply_optimistic(undo);
        assert!(!cache.is_completed(&read.id));

        cache.rollback(&read.id);
        assert!(!cache.is_dirty());
        assert_eq!(cache.completion_for(&read.id), Some(&stored));
    }

    #[tokio::test]
    async fn test_other_dates_are_ignored() {
        let (_store, read, _walk) = seeded().await;
        let mut cache = DayCache::new(UserId::new("u1"), day());
        let mut row = done(&read);
        row.completion_date = day().succ_opt().unwrap();
        assert!(!cache.apply_optimistic(row));
        assert!(cache.completions().is_empty());
    }

    struct BrokenUsers;

    #[async_trait]
    impl UserStore for BrokenUsers {
        async fn get_user(&self, _user_id: &UserId) -> StoreResult<Option<User>> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        async fn update_user(&self, _user_id: &UserId, _update: &UserUpdate) -> StoreResult<()> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_user_read_keeps_snapshot() {
        let (store, _read, _walk) = seeded().await;
        let mut stores = Stores::from_backend(store);
        let mut cache = DayCache::new(UserId::new("u1"), day());
        assert!(cache.load(&stores).await);
        let before = cache.user().cloned();

        stores.users = Arc::new(BrokenUsers);
        assert!(!cache.load(&stores).await);
        assert!(cache.is_stale());
        assert_eq!(cache.user().cloned(), before);
        assert_eq!(cache.habits().len(), 2);
    }
}
