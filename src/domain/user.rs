use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gamification::level_for_xp;

/// Identifier of a user account in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user and their gamification counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Lifetime XP. Never decreases.
    pub total_xp: u64,
    /// Always `level_for_xp(total_xp)` once an award has been persisted
    pub current_level: u32,
    pub current_streak: u32,
    /// Best streak ever seen. Never decreases.
    pub longest_streak: u32,
}

impl User {
    /// Create a fresh user at level 1 with no XP or streak
    pub fn new(id: UserId, display_name: Option<String>) -> Self {
        Self {
            id,
            display_name,
            created_at: Utc::now(),
            total_xp: 0,
            current_level: 1,
            current_streak: 0,
            longest_streak: 0,
        }
    }

    /// Level derived from XP, independent of the stored `current_level`
    pub fn derived_level(&self) -> u32 {
        level_for_xp(self.total_xp)
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, update: &UserUpdate) {
        if let Some(display_name) = &update.display_name {
            self.display_name = Some(display_name.clone());
        }
        if let Some(total_xp) = update.total_xp {
            self.total_xp = total_xp;
        }
        if let Some(level) = update.current_level {
            self.current_level = level;
        }
        if let Some(streak) = update.current_streak {
            self.current_streak = streak;
        }
        if let Some(longest) = update.longest_streak {
            self.longest_streak = longest;
        }
    }
}

/// Partial set of user fields for `UserStore::update_user`.
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_xp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_streak: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longest_streak: Option<u32>,
}

impl UserUpdate {
    pub fn xp(total_xp: u64, current_level: u32) -> Self {
        Self {
            total_xp: Some(total_xp),
            current_level: Some(current_level),
            ..Self::default()
        }
    }

    pub fn streak(current_streak: u32, longest_streak: u32) -> Self {
        Self {
            current_streak: Some(current_streak),
            longest_streak: Some(longest_streak),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_touches_set_fields() {
        let mut user = User::new(UserId::new("u1"), Some("Ana".to_string()));
        user.longest_streak = 4;

        user.apply(&UserUpdate::xp(250, 2));

        assert_eq!(user.total_xp, 250);
        assert_eq!(user.current_level, 2);
        assert_eq!(user.longest_streak, 4);
        assert_eq!(user.display_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_update_serializes_only_present_fields() {
        let json = serde_json::to_value(UserUpdate::streak(3, 9)).unwrap();
        assert_eq!(json, serde_json::json!({"current_streak": 3, "longest_streak": 9}));
        assert!(UserUpdate::default().is_empty());
    }
}
