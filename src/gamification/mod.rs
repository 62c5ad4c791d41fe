//! Gamification: XP, levels, daily streaks and badges
//!
//! All rules are pure functions over domain types; [`GamificationEngine`]
//! wires them to the stores.

mod checker;
mod definitions;
mod engine;
mod levels;
mod streaks;

pub use checker::is_perfect_day;
pub use definitions::{Badge, BadgeCategory, BadgeType, BADGES};
pub use engine::{
    AchievementReport, CompletionOutcome, FailedAward, GamificationEngine, GamificationError,
    GamificationEvent,
};
pub use levels::{level_for_xp, xp_threshold_for_level, LevelProgress, XpRewards, MAX_DISPLAY_LEVEL};
pub use streaks::{count_streak, StreakPolicy, StreakUpdate};
