//! Persistence collaborators
//!
//! The gamification engine never talks to a database directly. It goes
//! through the traits below, which mirror the hosted store's data-access
//! functions. Two implementations ship with the crate:
//!
//! - [`SqliteStore`]: local database (`~/.habitual/habits.db`)
//! - [`MemoryStore`]: process-local maps, used by tests and demos
//!
//! Every call is a single atomic write or read per row. Callers decide how
//! to degrade on failure.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Achievement, Habit, HabitCompletion, NewAchievement, User, UserId, UserUpdate};

/// Error returned by store implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Reads and writes habit completions
#[async_trait]
pub trait CompletionStore: Send + Sync {
    /// All completions of a user on one calendar day
    async fn get_completions_for_date(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> StoreResult<Vec<HabitCompletion>>;

    /// Insert or replace the completion for (habit, date) and return the stored row
    async fn upsert_completion(&self, completion: &HabitCompletion) -> StoreResult<HabitCompletion>;

    /// Every completion the user has ever recorded
    async fn get_completion_history(&self, user_id: &UserId) -> StoreResult<Vec<HabitCompletion>>;
}

/// Reads and writes user rows
#[async_trait]
pub trait UserStore: Send + Sync {
    /// `Ok(None)` when the user does not exist
    async fn get_user(&self, user_id: &UserId) -> StoreResult<Option<User>>;

    /// Write the `Some` fields of `update` atomically
    async fn update_user(&self, user_id: &UserId, update: &UserUpdate) -> StoreResult<()>;
}

/// Reads and writes earned badges
#[async_trait]
pub trait AchievementStore: Send + Sync {
    async fn get_achievements(&self, user_id: &UserId) -> StoreResult<Vec<Achievement>>;

    /// Record a badge. If the user already holds this badge type the existing
    /// record is returned and nothing is inserted.
    ///
    /// The flag is `true` only when a new row was written.
    async fn create_achievement(
        &self,
        achievement: &NewAchievement,
    ) -> StoreResult<(Achievement, bool)>;
}

/// Reads and writes habits
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// Habits ordered by `order_index`, archived ones included
    async fn get_habits(&self, user_id: &UserId) -> StoreResult<Vec<Habit>>;

    async fn create_habit(&self, habit: &Habit) -> StoreResult<Habit>;
}

/// The set of collaborators the engine and cache work against
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub completions: Arc<dyn CompletionStore>,
    pub achievements: Arc<dyn AchievementStore>,
    pub habits: Arc<dyn HabitStore>,
}

impl Stores {
    /// Use one backend for every collaborator
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: UserStore + CompletionStore + AchievementStore + HabitStore + 'static,
    {
        Self {
            users: backend.clone(),
            completions: backend.clone(),
            achievements: backend.clone(),
            habits: backend,
        }
    }
}
