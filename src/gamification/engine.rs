//! Gamification engine - XP awards, streak updates and badge evaluation
//!
//! Stateless between calls: every operation reads what it needs from the
//! stores, decides, and writes back. The in-memory [`User`] is only advanced
//! after the corresponding write succeeded.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::checker::{
    check_level_badges, check_milestone_badges, check_perfect_day, check_perfect_week,
    check_streak_badges, check_time_of_day_badges,
};
use super::definitions::BadgeType;
use super::levels::level_for_xp;
use super::streaks::{count_streak, StreakUpdate};
use crate::clock::{Clock, SystemClock};
use crate::config::GamificationSettings;
use crate::domain::{
    any_completed, Achievement, CompletionToggle, Habit, HabitCompletion, NewAchievement, User,
    UserId, UserUpdate,
};
use crate::store::{StoreError, Stores};

/// Errors surfaced by engine operations
#[derive(Debug, thiserror::Error)]
pub enum GamificationError {
    #[error("XP amount must be positive")]
    InvalidXpAmount,

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Failed to {operation}: {source}")]
    Persist {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Failed to load {what}: {source}")]
    Load {
        what: &'static str,
        #[source]
        source: StoreError,
    },
}

pub type Result<T> = std::result::Result<T, GamificationError>;

/// Events that can happen during a gamification pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GamificationEvent {
    XpAwarded { amount: u32, total_xp: u64 },
    LevelUp { old_level: u32, new_level: u32 },
    StreakUpdated { current_streak: u32, longest_streak: u32 },
    AchievementUnlocked { badge_type: BadgeType },
}

impl std::fmt::Display for GamificationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::XpAwarded { amount, total_xp } => write!(f, "+{} XP ({} total)", amount, total_xp),
            Self::LevelUp { new_level, .. } => write!(f, "Level up! You reached level {}", new_level),
            Self::StreakUpdated { current_streak, .. } => {
                write!(f, "🔥 {}-day streak", current_streak)
            }
            Self::AchievementUnlocked { badge_type } => {
                let badge = badge_type.definition();
                write!(f, "{} Badge unlocked: {}", badge.icon, badge.name)
            }
        }
    }
}

/// A badge that qualified but could not be written
#[derive(Debug)]
pub struct FailedAward {
    pub badge_type: BadgeType,
    pub error: StoreError,
}

/// Result of one achievement evaluation pass
#[derive(Debug, Default)]
pub struct AchievementReport {
    pub unlocked: Vec<Achievement>,
    pub failed: Vec<FailedAward>,
}

impl AchievementReport {
    pub fn events(&self) -> Vec<GamificationEvent> {
        self.unlocked
            .iter()
            .map(|a| GamificationEvent::AchievementUnlocked {
                badge_type: a.badge_type,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty() && self.failed.is_empty()
    }
}

/// Result of toggling a habit
#[derive(Debug)]
pub struct CompletionOutcome {
    /// The row as stored
    pub completion: HabitCompletion,
    pub events: Vec<GamificationEvent>,
    /// Follow-up steps that failed after the completion was saved
    pub warnings: Vec<String>,
}

/// Main entry point for all gamification features
pub struct GamificationEngine {
    stores: Stores,
    clock: Arc<dyn Clock>,
    settings: GamificationSettings,
}

impl GamificationEngine {
    pub fn new(stores: Stores, clock: Arc<dyn Clock>, settings: GamificationSettings) -> Self {
        Self {
            stores,
            clock,
            settings,
        }
    }

    /// Engine on the system clock
    pub fn with_system_clock(stores: Stores, settings: GamificationSettings) -> Self {
        Self::new(stores, Arc::new(SystemClock), settings)
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn settings(&self) -> &GamificationSettings {
        &self.settings
    }

    /// Fetch a user, failing if it does not exist
    pub async fn load_user(&self, user_id: &UserId) -> Result<User> {
        self.stores
            .users
            .get_user(user_id)
            .await
            .map_err(|source| GamificationError::Load {
                what: "user",
                source,
            })?
            .ok_or_else(|| GamificationError::UserNotFound(user_id.clone()))
    }

    // ========================================
    // XP & LEVELS
    // ========================================

    /// Add `amount` XP, recompute the level and persist both.
    ///
    /// Returns `XpAwarded` plus `LevelUp` when the level increased.
    pub async fn award_xp(&self, user: &mut User, amount: u32) -> Result<Vec<GamificationEvent>> {
        if amount == 0 {
            return Err(GamificationError::InvalidXpAmount);
        }

        let total_xp = user.total_xp.saturating_add(u64::from(amount));
        let new_level = level_for_xp(total_xp);
        let update = UserUpdate::xp(total_xp, new_level);

        self.stores
            .users
            .update_user(&user.id, &update)
            .await
            .map_err(|source| {
                warn!("Failed to persist XP for {}: {}", user.id, source);
                GamificationError::Persist {
                    operation: "award XP",
                    source,
                }
            })?;

        let old_level = user.current_level;
        user.apply(&update);
        debug!("{} +{} XP -> {} (level {})", user.id, amount, total_xp, new_level);

        let mut events = vec![GamificationEvent::XpAwarded { amount, total_xp }];
        if new_level > old_level {
            info!("{} reached level {}", user.id, new_level);
            events.push(GamificationEvent::LevelUp {
                old_level,
                new_level,
            });
        }
        Ok(events)
    }

    // ========================================
    // STREAKS
    // ========================================

    /// Recompute the daily streak from completion history and persist it if
    /// either value changed.
    ///
    /// Days whose completions cannot be read count as inactive.
    pub async fn recompute_streak(&self, user: &mut User) -> Result<StreakUpdate> {
        let today = self.clock.today();
        let completions = &self.stores.completions;
        let user_id = &user.id;

        let computed = count_streak(today, self.settings.streak_policy(), |day| {
            let completions = Arc::clone(completions);
            let user_id = user_id.clone();
            async move {
                match completions.get_completions_for_date(&user_id, day).await {
                    Ok(rows) => any_completed(&rows),
                    Err(e) => {
                        warn!("Failed to read completions for {} on {}: {}", user_id, day, e);
                        false
                    }
                }
            }
        })
        .await;

        let update = StreakUpdate::resolve(user.current_streak, user.longest_streak, computed);
        debug!(
            "{} streak {} (longest {}), changed: {}",
            user.id, update.current_streak, update.longest_streak, update.changed
        );

        if update.changed {
            let user_update = UserUpdate::streak(update.current_streak, update.longest_streak);
            self.stores
                .users
                .update_user(&user.id, &user_update)
                .await
                .map_err(|source| {
                    warn!("Failed to persist streak for {}: {}", user.id, source);
                    GamificationError::Persist {
                        operation: "update streak",
                        source,
                    }
                })?;
            user.apply(&user_update);
        }

        Ok(update)
    }

    // ========================================
    // ACHIEVEMENTS
    // ========================================

    /// Already-earned badge types. A failed read is treated as none earned;
    /// the store's uniqueness constraint still prevents duplicates.
    async fn earned_badges(&self, user_id: &UserId) -> HashSet<BadgeType> {
        match self.stores.achievements.get_achievements(user_id).await {
            Ok(list) => list.into_iter().map(|a| a.badge_type).collect(),
            Err(e) => {
                warn!("Failed to read achievements for {}: {}", user_id, e);
                HashSet::new()
            }
        }
    }

    /// Badge types `user` qualifies for and has not earned yet
    pub fn qualifying_badges(
        &self,
        user: &User,
        habits: &[Habit],
        completions: &[HabitCompletion],
        earned: &HashSet<BadgeType>,
    ) -> Vec<BadgeType> {
        let today = self.clock.today();
        let today_rows: Vec<HabitCompletion> = completions
            .iter()
            .filter(|c| c.completion_date == today)
            .cloned()
            .collect();
        let completed_total = completions.iter().filter(|c| c.completed).count();
        let hours: Vec<u32> = today_rows
            .iter()
            .filter(|c| c.completed)
            .filter_map(|c| c.completed_at)
            .map(|at| self.clock.local_hour(at))
            .collect();

        let mut badges = Vec::new();
        badges.extend(check_milestone_badges(completed_total, earned));
        badges.extend(check_streak_badges(user.current_streak, earned));
        badges.extend(check_perfect_day(habits, &today_rows, earned));
        badges.extend(check_perfect_week(habits, completions, today, earned));
        badges.extend(check_time_of_day_badges(&hours, earned));
        badges.extend(check_level_badges(user.derived_level(), earned));
        badges
    }

    /// Award every badge the user newly qualifies for.
    ///
    /// Each award is written independently. Failed writes are logged and
    /// reported, never retried within the pass.
    pub async fn evaluate_achievements(
        &self,
        user: &User,
        habits: &[Habit],
        completions: &[HabitCompletion],
    ) -> AchievementReport {
        let earned = self.earned_badges(&user.id).await;
        let candidates = self.qualifying_badges(user, habits, completions, &earned);
        if candidates.is_empty() {
            return AchievementReport::default();
        }

        let now = self.clock.now_utc();
        let writes = candidates.iter().map(|badge_type| {
            let new = NewAchievement::new(user.id.clone(), *badge_type, now);
            let store = Arc::clone(&self.stores.achievements);
            async move { store.create_achievement(&new).await }
        });
        let results = join_all(writes).await;

        let mut report = AchievementReport::default();
        for (badge_type, result) in candidates.into_iter().zip(results) {
            match result {
                Ok((achievement, true)) => {
                    info!("{} unlocked badge {}", user.id, badge_type);
                    report.unlocked.push(achievement);
                }
                Ok((_, false)) => {
                    debug!("{} already holds badge {}", user.id, badge_type);
                }
                Err(error) => {
                    warn!("Failed to award {} to {}: {}", badge_type, user.id, error);
                    report.failed.push(FailedAward { badge_type, error });
                }
            }
        }
        report
    }

    // ========================================
    // COMPLETION FLOW
    // ========================================

    /// Save a habit toggle and run the gamification follow-ups for today.
    ///
    /// Only the completion write is fatal. XP, streak and badge failures are
    /// collected in [`CompletionOutcome::warnings`].
    pub async fn record_completion(
        &self,
        user: &mut User,
        toggle: CompletionToggle,
    ) -> Result<CompletionOutcome> {
        let is_today = toggle.date == self.clock.today();
        let completed = toggle.completed;

        let row = toggle.into_completion(user.id.clone(), self.clock.now_utc());
        let completion = self
            .stores
            .completions
            .upsert_completion(&row)
            .await
            .map_err(|source| GamificationError::Persist {
                operation: "save completion",
                source,
            })?;

        let mut outcome = CompletionOutcome {
            completion,
            events: Vec::new(),
            warnings: Vec::new(),
        };

        if !is_today {
            debug!("Completion for {} is not today, skipping rewards", row.completion_date);
            return Ok(outcome);
        }

        match self.recompute_streak(user).await {
            Ok(update) if update.changed => {
                outcome.events.push(GamificationEvent::StreakUpdated {
                    current_streak: update.current_streak,
                    longest_streak: update.longest_streak,
                });
            }
            Ok(_) => {}
            Err(e) => outcome.warnings.push(e.to_string()),
        }

        if !completed {
            return Ok(outcome);
        }

        match self.award_xp(user, self.settings.xp_per_habit).await {
            Ok(events) => outcome.events.extend(events),
            Err(e) => outcome.warnings.push(e.to_string()),
        }

        let habits = match self.stores.habits.get_habits(&user.id).await {
            Ok(habits) => habits,
            Err(e) => {
                warn!("Failed to read habits for {}: {}", user.id, e);
                outcome.warnings.push(format!("Failed to load habits: {}", e));
                Vec::new()
            }
        };
        let history = match self.stores.completions.get_completion_history(&user.id).await {
            Ok(history) => history,
            Err(e) => {
                warn!("Failed to read completion history for {}: {}", user.id, e);
                outcome
                    .warnings
                    .push(format!("Failed to load completion history: {}", e));
                vec![outcome.completion.clone()]
            }
        };

        let report = self.evaluate_achievements(user, &habits, &history).await;
        outcome.events.extend(report.events());
        outcome.warnings.extend(
            report
                .failed
                .iter()
                .map(|f| format!("Failed to award {}: {}", f.badge_type, f.error)),
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::domain::{Category, HabitId};
    use crate::store::{HabitStore, MemoryStore};
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn engine(store: Arc<MemoryStore>) -> GamificationEngine {
        GamificationEngine::new(
            Stores::from_backend(store),
            Arc::new(FixedClock::on(today())),
            GamificationSettings::default(),
        )
    }

    fn seeded() -> (Arc<MemoryStore>, User) {
        let store = Arc::new(MemoryStore::new());
        let user = User::new(UserId::new("u1"), None);
        store.insert_user(user.clone()).unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn test_award_xp_levels_up() {
        let (store, mut user) = seeded();
        let engine = engine(store.clone());

        let events = engine.award_xp(&mut user, 100).await.unwrap();
        assert_eq!(user.total_xp, 100);
        assert_eq!(user.current_level, 2);
        assert!(events.contains(&GamificationEvent::LevelUp {
            old_level: 1,
            new_level: 2
        }));

        let events = engine.award_xp(&mut user, 150).await.unwrap();
        assert_eq!(user.total_xp, 250);
        assert_eq!(user.current_level, 2);
        assert_eq!(events.len(), 1);

        let stored = engine.load_user(&user.id).await.unwrap();
        assert_eq!(stored.total_xp, 250);
        assert_eq!(stored.current_level, 2);
    }

    #[tokio::test]
    async fn test_award_zero_xp_rejected() {
        let (store, mut user) = seeded();
        let engine = engine(store.clone());

        let err = engine.award_xp(&mut user, 0).await.unwrap_err();
        assert!(matches!(err, GamificationError::InvalidXpAmount));
        assert_eq!(store.user_update_count(), 0);
    }

    #[tokio::test]
    async fn test_unchanged_streak_is_not_written() {
        let (store, mut user) = seeded();
        let engine = engine(store.clone());

        let update = engine.recompute_streak(&mut user).await.unwrap();
        assert_eq!(update.current_streak, 0);
        assert!(!update.changed);
        assert_eq!(store.user_update_count(), 0);
    }

    #[tokio::test]
    async fn test_record_completion_for_past_day_skips_rewards() {
        let (store, mut user) = seeded();
        let engine = engine(store.clone());
        let yesterday = today().pred_opt().unwrap();

        let outcome = engine
            .record_completion(&mut user, CompletionToggle::done(HabitId::new("h1"), yesterday))
            .await
            .unwrap();

        assert!(outcome.completion.completed);
        assert!(outcome.events.is_empty());
        assert_eq!(user.total_xp, 0);
    }

    #[test]
    fn test_event_display() {
        let event = GamificationEvent::AchievementUnlocked {
            badge_type: BadgeType::WeekWarrior,
        };
        assert_eq!(event.to_string(), "🔥 Badge unlocked: Week Warrior");

        let event = GamificationEvent::XpAwarded {
            amount: 10,
            total_xp: 40,
        };
        assert_eq!(event.to_string(), "+10 XP (40 total)");
    }

    #[tokio::test]
    async fn test_first_completion_unlocks_first_day() {
        let (store, mut user) = seeded();
        let engine = engine(store.clone());
        let habit = Habit::new(user.id.clone(), "Read", Category::new("📚", "Learning"));
        let habit = store.create_habit(&habit).await.unwrap();

        let outcome = engine
            .record_completion(&mut user, CompletionToggle::done(habit.id.clone(), today()))
            .await
            .unwrap();

        assert!(outcome.warnings.is_empty());
        let unlocked: Vec<BadgeType> = outcome
            .events
            .iter()
            .filter_map(|e| match e {
                GamificationEvent::AchievementUnlocked { badge_type } => Some(*badge_type),
                _ => None,
            })
            .collect();
        assert!(unlocked.contains(&BadgeType::FirstDay));
        assert!(unlocked.contains(&BadgeType::PerfectDay));
        assert_eq!(user.current_streak, 1);
        assert_eq!(user.total_xp, 10);
    }
}
