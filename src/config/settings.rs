//! Settings configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::gamification::{StreakPolicy, XpRewards};

/// XP and streak tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamificationSettings {
    /// XP awarded for each habit completed today
    #[serde(default = "default_xp_per_habit")]
    pub xp_per_habit: u32,

    /// How many days back the streak walk may look (today included)
    #[serde(default = "default_streak_lookback_days")]
    pub streak_lookback_days: u32,

    /// Keep yesterday's run alive while today has no completion yet.
    /// When false (default), an empty today resets the streak to 0.
    #[serde(default)]
    pub count_pending_today: bool,
}

fn default_xp_per_habit() -> u32 {
    XpRewards::HABIT_COMPLETED
}

fn default_streak_lookback_days() -> u32 {
    3650
}

impl Default for GamificationSettings {
    fn default() -> Self {
        Self {
            xp_per_habit: default_xp_per_habit(),
            streak_lookback_days: default_streak_lookback_days(),
            count_pending_today: false,
        }
    }
}

impl GamificationSettings {
    pub fn streak_policy(&self) -> StreakPolicy {
        StreakPolicy {
            count_pending_today: self.count_pending_today,
            lookback_days: self.streak_lookback_days,
        }
    }
}

/// Local database settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// SQLite file. A leading `~/` is expanded. Defaults to `~/.habitual/habits.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}
