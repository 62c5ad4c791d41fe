//! XP and level system
//!
//! Level is a pure function of lifetime XP: `floor(sqrt(xp / 100)) + 1`.
//! Level `n` starts at `(n - 1)^2 * 100` XP, so each level costs 200 XP
//! more than the one before.

use serde::{Deserialize, Serialize};

/// Highest level shown in progress displays (980,100 XP)
pub const MAX_DISPLAY_LEVEL: u32 = 100;

/// Level reached with `total_xp` lifetime XP (always ≥ 1)
pub fn level_for_xp(total_xp: u64) -> u32 {
    // floor(sqrt(x / 100)) == isqrt(x div 100) for integers, no float rounding
    let root = (total_xp / 100).isqrt();
    u32::try_from(root).unwrap_or(u32::MAX - 1) + 1
}

/// XP at which `level` starts. Level 0 is treated as level 1.
pub fn xp_threshold_for_level(level: u32) -> u64 {
    let n = u64::from(level.saturating_sub(1));
    n.saturating_mul(n).saturating_mul(100)
}

/// Where a user stands inside their current level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub total_xp: u64,
    pub level: u32,
    /// XP at which the current level started
    pub current_level_xp: u64,
    /// XP at which the next level starts
    pub next_level_xp: u64,
}

impl LevelProgress {
    pub fn for_xp(total_xp: u64) -> Self {
        let level = level_for_xp(total_xp);
        Self {
            total_xp,
            level,
            current_level_xp: xp_threshold_for_level(level),
            next_level_xp: xp_threshold_for_level(level.saturating_add(1)),
        }
    }

    /// XP still needed to level up
    pub fn xp_to_next(&self) -> u64 {
        self.next_level_xp.saturating_sub(self.total_xp)
    }

    /// Progress to next level (0.0 - 1.0)
    pub fn progress_to_next(&self) -> f32 {
        let span = self.next_level_xp.saturating_sub(self.current_level_xp);
        if span == 0 {
            return 1.0;
        }
        let into_level = self.total_xp.saturating_sub(self.current_level_xp);
        (into_level as f32 / span as f32).clamp(0.0, 1.0)
    }

    pub fn is_max_display_level(&self) -> bool {
        self.level >= MAX_DISPLAY_LEVEL
    }
}

/// XP rewards for habit actions
pub struct XpRewards;

impl XpRewards {
    /// XP for completing one habit today
    pub const HABIT_COMPLETED: u32 = 10;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_xp() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(250), 2);
        assert_eq!(level_for_xp(399), 2);
        assert_eq!(level_for_xp(400), 3);
        assert_eq!(level_for_xp(8_100), 10);
        assert_eq!(level_for_xp(990_000), 100);
    }

    #[test]
    fn test_level_for_xp_is_monotonic() {
        let mut previous = level_for_xp(0);
        for xp in (0..200_000u64).step_by(37) {
            let level = level_for_xp(xp);
            assert!(level >= previous, "level dropped at {} XP", xp);
            previous = level;
        }
    }

    #[test]
    fn test_threshold_is_consistent_with_level() {
        for xp in [0u64, 1, 99, 100, 101, 250, 399, 400, 12_345, 990_000, u64::MAX] {
            let level = level_for_xp(xp);
            let threshold = xp_threshold_for_level(level);
            assert!(level_for_xp(threshold) <= level);
            assert!(threshold <= xp);
        }
        for level in 1..=120u32 {
            assert_eq!(level_for_xp(xp_threshold_for_level(level)), level);
        }
    }

    #[test]
    fn test_threshold_for_level_zero_and_one() {
        assert_eq!(xp_threshold_for_level(0), 0);
        assert_eq!(xp_threshold_for_level(1), 0);
        assert_eq!(xp_threshold_for_level(2), 100);
        assert_eq!(xp_threshold_for_level(11), 10_000);
    }

    #[test]
    fn test_progress() {
        let progress = LevelProgress::for_xp(250); // level 2: 100..400
        assert_eq!(progress.level, 2);
        assert_eq!(progress.current_level_xp, 100);
        assert_eq!(progress.next_level_xp, 400);
        assert_eq!(progress.xp_to_next(), 150);
        assert!((progress.progress_to_next() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_max_display_level_boundary() {
        assert!(!LevelProgress::for_xp(980_099).is_max_display_level());
        let capped = LevelProgress::for_xp(980_100);
        assert_eq!(capped.level, MAX_DISPLAY_LEVEL);
        assert!(capped.is_max_display_level());
    }
}
