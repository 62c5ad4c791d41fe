use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Category, UserId};

/// Identifier of a habit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(pub String);

impl HabitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HabitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Priority of a habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
    Critical,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Unit of a habit's weekly target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiType {
    #[default]
    Days,
    Times,
    Hours,
    Minutes,
}

impl KpiType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Times => "times",
            Self::Hours => "hours",
            Self::Minutes => "minutes",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "days" => Some(Self::Days),
            "times" => Some(Self::Times),
            "hours" => Some(Self::Hours),
            "minutes" => Some(Self::Minutes),
            _ => None,
        }
    }
}

/// A habit the user tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub user_id: UserId,
    pub name: String,
    pub emoji: String,
    pub category: Category,
    pub estimated_minutes: u32,
    /// Position in the user's list (lower first)
    pub order_index: u32,
    /// Archived habits are hidden and never count toward a perfect day
    pub is_archived: bool,
    pub times_per_week: Option<u8>,
    pub importance: Option<Importance>,
    pub kpi_type: Option<KpiType>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create an active habit with a generated id
    pub fn new(user_id: UserId, name: impl Into<String>, category: Category) -> Self {
        let emoji = category.emoji.clone();
        Self {
            id: HabitId::generate(),
            user_id,
            name: name.into(),
            emoji,
            category,
            estimated_minutes: 5,
            order_index: 0,
            is_archived: false,
            times_per_week: None,
            importance: Some(Importance::Medium),
            kpi_type: Some(KpiType::Days),
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.is_archived
    }
}
