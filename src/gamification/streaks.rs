//! Daily streak calculation
//!
//! A day is active when at least one habit was completed on it. The streak
//! is the run of consecutive active days ending today, recomputed from
//! history on every call rather than incremented.

use std::future::Future;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// How the backward walk treats today and how far it may go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakPolicy {
    /// Count the run ending yesterday while today has no completion yet
    pub count_pending_today: bool,
    /// Maximum number of days inspected
    pub lookback_days: u32,
}

impl Default for StreakPolicy {
    fn default() -> Self {
        Self {
            count_pending_today: false,
            lookback_days: 3650,
        }
    }
}

/// Result of a streak recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Whether either value differs from what was stored
    pub changed: bool,
}

impl StreakUpdate {
    /// Combine a fresh count with the stored values. `longest_streak` never drops.
    pub fn resolve(stored_current: u32, stored_longest: u32, computed: u32) -> Self {
        let longest_streak = stored_longest.max(computed);
        Self {
            current_streak: computed,
            longest_streak,
            changed: computed != stored_current || longest_streak != stored_longest,
        }
    }
}

/// Walk backward from `today`, asking `is_active` about each day, and count
/// the consecutive active run.
///
/// Stops at the first inactive day, at the start of the calendar, or once
/// `policy.lookback_days` days (today included) have been inspected.
pub async fn count_streak<F, Fut>(today: NaiveDate, policy: StreakPolicy, mut is_active: F) -> u32
where
    F: FnMut(NaiveDate) -> Fut,
    Fut: Future<Output = bool>,
{
    let mut remaining = policy.lookback_days;
    if remaining == 0 {
        return 0;
    }

    let mut day = today;
    remaining -= 1;
    if !is_active(day).await {
        if !policy.count_pending_today || remaining == 0 {
            return 0;
        }
        let Some(yesterday) = day.checked_sub_days(Days::new(1)) else {
            return 0;
        };
        day = yesterday;
        remaining -= 1;
        if !is_active(day).await {
            return 0;
        }
    }

    let mut count = 1;
    while remaining > 0 {
        let Some(previous) = day.checked_sub_days(Days::new(1)) else {
            break;
        };
        if !is_active(previous).await {
            break;
        }
        count += 1;
        day = previous;
        remaining -= 1;
    }
    count
}
