//! Shared test utilities for engine and store integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, TimeZone, Utc};

use habitual::clock::FixedClock;
use habitual::config::GamificationSettings;
use habitual::gamification::GamificationEngine;
use habitual::store::{
    AchievementStore, CompletionStore, HabitStore, MemoryStore, StoreError, StoreResult, Stores,
    UserStore,
};
use habitual::{
    Achievement, Category, Habit, HabitCompletion, NewAchievement, User, UserId, UserUpdate,
};

/// Parse a `YYYY-MM-DD` date
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// `n` days before `day`
pub fn days_before(day: NaiveDate, n: u64) -> NaiveDate {
    day.checked_sub_days(Days::new(n)).expect("date in range")
}

pub fn user_id() -> UserId {
    UserId::new("test-user")
}

/// Memory store with one fresh user
pub fn seeded_store() -> (Arc<MemoryStore>, User) {
    let store = Arc::new(MemoryStore::new());
    let user = User::new(user_id(), Some("Tester".to_string()));
    store.insert_user(user.clone()).expect("insert user");
    (store, user)
}

/// Engine whose "today" is noon UTC on `today`
pub fn engine_on(stores: Stores, today: NaiveDate) -> GamificationEngine {
    GamificationEngine::new(
        stores,
        Arc::new(FixedClock::on(today)),
        GamificationSettings::default(),
    )
}

pub async fn add_habit(store: &MemoryStore, name: &str) -> Habit {
    let habit = Habit::new(user_id(), name, Category::new("📋", "General"));
    store.create_habit(&habit).await.expect("create habit")
}

/// Store a completed row for `habit` on `day`, finished at noon UTC
pub async fn complete(store: &MemoryStore, habit: &Habit, day: NaiveDate) -> HabitCompletion {
    complete_at(store, habit, day, 12).await
}

/// Store a completed row for `habit` on `day`, finished at `hour` UTC
pub async fn complete_at(
    store: &MemoryStore,
    habit: &Habit,
    day: NaiveDate,
    hour: u32,
) -> HabitCompletion {
    let mut row = HabitCompletion::new(user_id(), habit.id.clone(), day);
    row.completed = true;
    row.completed_at = day
        .and_hms_opt(hour, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive));
    store.upsert_completion(&row).await.expect("upsert completion")
}

/// Every row stored for the test user, oldest first
pub async fn history(store: &MemoryStore) -> Vec<HabitCompletion> {
    store
        .get_completion_history(&user_id())
        .await
        .expect("read history")
}

/// Wraps a [`MemoryStore`] and fails selected operations on demand
pub struct FlakyStore {
    pub inner: Arc<MemoryStore>,
    pub fail_user_updates: AtomicBool,
    pub fail_completion_reads: AtomicBool,
    pub fail_completion_writes: AtomicBool,
    pub fail_achievement_reads: AtomicBool,
    pub fail_achievement_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_user_updates: AtomicBool::new(false),
            fail_completion_reads: AtomicBool::new(false),
            fail_completion_writes: AtomicBool::new(false),
            fail_achievement_reads: AtomicBool::new(false),
            fail_achievement_writes: AtomicBool::new(false),
        })
    }

    fn check(flag: &AtomicBool, what: &str) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{} failed", what)));
        }
        Ok(())
    }
}

pub fn set(flag: &AtomicBool, on: bool) {
    flag.store(on, Ordering::SeqCst);
}

#[async_trait]
impl UserStore for FlakyStore {
    async fn get_user(&self, user_id: &UserId) -> StoreResult<Option<User>> {
        self.inner.get_user(user_id).await
    }

    async fn update_user(&self, user_id: &UserId, update: &UserUpdate) -> StoreResult<()> {
        Self::check(&self.fail_user_updates, "update_user")?;
        self.inner.update_user(user_id, update).await
    }
}

#[async_trait]
impl CompletionStore for FlakyStore {
    async fn get_completions_for_date(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> StoreResult<Vec<HabitCompletion>> {
        Self::check(&self.fail_completion_reads, "get_completions_for_date")?;
        self.inner.get_completions_for_date(user_id, date).await
    }

    async fn upsert_completion(&self, completion: &HabitCompletion) -> StoreResult<HabitCompletion> {
        Self::check(&self.fail_completion_writes, "upsert_completion")?;
        self.inner.upsert_completion(completion).await
    }

    async fn get_completion_history(&self, user_id: &UserId) -> StoreResult<Vec<HabitCompletion>> {
        Self::check(&self.fail_completion_reads, "get_completion_history")?;
        self.inner.get_completion_history(user_id).await
    }
}

#[async_trait]
impl AchievementStore for FlakyStore {
    async fn get_achievements(&self, user_id: &UserId) -> StoreResult<Vec<Achievement>> {
        Self::check(&self.fail_achievement_reads, "get_achievements")?;
        self.inner.get_achievements(user_id).await
    }

    async fn create_achievement(
        &self,
        achievement: &NewAchievement,
    ) -> StoreResult<(Achievement, bool)> {
        Self::check(&self.fail_achievement_writes, "create_achievement")?;
        self.inner.create_achievement(achievement).await
    }
}

#[async_trait]
impl HabitStore for FlakyStore {
    async fn get_habits(&self, user_id: &UserId) -> StoreResult<Vec<Habit>> {
        self.inner.get_habits(user_id).await
    }

    async fn create_habit(&self, habit: &Habit) -> StoreResult<Habit> {
        self.inner.create_habit(habit).await
    }
}
