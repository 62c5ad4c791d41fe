use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use crate::gamification::BadgeType;

/// A badge a user has earned. At most one per (user, badge_type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub user_id: UserId,
    pub badge_type: BadgeType,
    pub earned_at: DateTime<Utc>,
}

/// Insert payload for `AchievementStore::create_achievement`
#[derive(Debug, Clone, PartialEq)]
pub struct NewAchievement {
    pub user_id: UserId,
    pub badge_type: BadgeType,
    pub earned_at: DateTime<Utc>,
}

impl NewAchievement {
    pub fn new(user_id: UserId, badge_type: BadgeType, earned_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            badge_type,
            earned_at,
        }
    }

    /// Materialize with a fresh id
    pub fn into_achievement(self) -> Achievement {
        Achievement {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: self.user_id,
            badge_type: self.badge_type,
            earned_at: self.earned_at,
        }
    }
}
