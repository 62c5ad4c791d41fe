//! Badge definitions and metadata
//!
//! All badges are defined here with their display data and thresholds.

use serde::{Deserialize, Serialize};

/// Unique identifier for each badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeType {
    // Milestone badges
    FirstDay,
    CenturyClub,
    #[serde(rename = "level_10")]
    Level10,
    #[serde(rename = "level_25")]
    Level25,
    #[serde(rename = "level_50")]
    Level50,

    // Streak badges
    WeekWarrior,
    MonthMaster,

    // Completion badges
    PerfectDay,
    PerfectWeek,

    // Time-of-day badges
    EarlyBird,
    NightOwl,
}

impl BadgeType {
    /// Get the string ID for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstDay => "first_day",
            Self::CenturyClub => "century_club",
            Self::Level10 => "level_10",
            Self::Level25 => "level_25",
            Self::Level50 => "level_50",
            Self::WeekWarrior => "week_warrior",
            Self::MonthMaster => "month_master",
            Self::PerfectDay => "perfect_day",
            Self::PerfectWeek => "perfect_week",
            Self::EarlyBird => "early_bird",
            Self::NightOwl => "night_owl",
        }
    }

    /// Parse from the stored string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "first_day" => Some(Self::FirstDay),
            "century_club" => Some(Self::CenturyClub),
            "level_10" => Some(Self::Level10),
            "level_25" => Some(Self::Level25),
            "level_50" => Some(Self::Level50),
            "week_warrior" => Some(Self::WeekWarrior),
            "month_master" => Some(Self::MonthMaster),
            "perfect_day" => Some(Self::PerfectDay),
            "perfect_week" => Some(Self::PerfectWeek),
            "early_bird" => Some(Self::EarlyBird),
            "night_owl" => Some(Self::NightOwl),
            _ => None,
        }
    }

    /// Get all badge types
    pub fn all() -> &'static [BadgeType] {
        &[
            Self::FirstDay,
            Self::WeekWarrior,
            Self::MonthMaster,
            Self::PerfectDay,
            Self::PerfectWeek,
            Self::EarlyBird,
            Self::NightOwl,
            Self::CenturyClub,
            Self::Level10,
            Self::Level25,
            Self::Level50,
        ]
    }

    /// Full definition for this badge
    pub fn definition(&self) -> &'static Badge {
        BADGES
            .iter()
            .find(|b| b.badge_type == *self)
            .unwrap_or(&BADGES[0])
    }
}

impl std::fmt::Display for BadgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Badge category for grouping in displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeCategory {
    Streak,
    Completion,
    Milestone,
    Special,
}

impl BadgeCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Streak => "Streaks",
            Self::Completion => "Completion",
            Self::Milestone => "Milestones",
            Self::Special => "Special",
        }
    }
}

/// Badge definition with all metadata
#[derive(Debug, Clone)]
pub struct Badge {
    pub badge_type: BadgeType,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: BadgeCategory,
    /// Count, streak length or level the condition compares against
    pub threshold: Option<u32>,
}

/// All badge definitions
pub static BADGES: &[Badge] = &[
    Badge {
        badge_type: BadgeType::FirstDay,
        name: "First Day",
        description: "Complete your first habit",
        icon: "⭐",
        category: BadgeCategory::Milestone,
        threshold: Some(1),
    },
    Badge {
        badge_type: BadgeType::WeekWarrior,
        name: "Week Warrior",
        description: "Maintain a 7-day streak",
        icon: "🔥",
        category: BadgeCategory::Streak,
        threshold: Some(7),
    },
    Badge {
        badge_type: BadgeType::MonthMaster,
        name: "Month Master",
        description: "Maintain a 30-day streak",
        icon: "🌟",
        category: BadgeCategory::Streak,
        threshold: Some(30),
    },
    Badge {
        badge_type: BadgeType::PerfectDay,
        name: "Perfect Day",
        description: "Complete all habits in one day",
        icon: "✨",
        category: BadgeCategory::Completion,
        threshold: None,
    },
    Badge {
        badge_type: BadgeType::PerfectWeek,
        name: "Perfect Week",
        description: "Complete all habits for a week",
        icon: "🎯",
        category: BadgeCategory::Completion,
        threshold: Some(7),
    },
    Badge {
        badge_type: BadgeType::EarlyBird,
        name: "Early Bird",
        description: "Complete 5 habits before 9 AM",
        icon: "⚡",
        category: BadgeCategory::Special,
        threshold: Some(5),
    },
    Badge {
        badge_type: BadgeType::NightOwl,
        name: "Night Owl",
        description: "Complete 5 habits after 9 PM",
        icon: "🦉",
        category: BadgeCategory::Special,
        threshold: Some(5),
    },
    Badge {
        badge_type: BadgeType::CenturyClub,
        name: "Century Club",
        description: "Reach 100 total completions",
        icon: "🏆",
        category: BadgeCategory::Milestone,
        threshold: Some(100),
    },
    Badge {
        badge_type: BadgeType::Level10,
        name: "Level 10",
        description: "Reach level 10",
        icon: "🎯",
        category: BadgeCategory::Milestone,
        threshold: Some(10),
    },
    Badge {
        badge_type: BadgeType::Level25,
        name: "Level 25",
        description: "Reach level 25",
        icon: "🎯",
        category: BadgeCategory::Milestone,
        threshold: Some(25),
    },
    Badge {
        badge_type: BadgeType::Level50,
        name: "Level 50",
        description: "Reach level 50",
        icon: "🎯",
        category: BadgeCategory::Milestone,
        threshold: Some(50),
    },
];

impl Badge {
    /// Look up a badge definition
    pub fn get(badge_type: BadgeType) -> &'static Badge {
        badge_type.definition()
    }

    /// Definitions grouped by category, in table order
    pub fn by_category(category: BadgeCategory) -> impl Iterator<Item = &'static Badge> {
        BADGES.iter().filter(move |b| b.category == category)
    }
}
