//! Badge checking logic
//!
//! Pure functions that decide which badges a user newly qualifies for.
//! Each takes the set of already-earned badges and never returns one of them.

use std::collections::{BTreeSet, HashSet};

use chrono::{Days, NaiveDate};

use super::definitions::BadgeType;
use crate::domain::{Habit, HabitCompletion, HabitId};

/// Hour (local) before which a completion counts toward Early Bird
pub const EARLY_BIRD_BEFORE_HOUR: u32 = 9;

/// Hour (local) from which a completion counts toward Night Owl
pub const NIGHT_OWL_FROM_HOUR: u32 = 21;

/// Check streak badges (2 badges)
pub fn check_streak_badges(current_streak: u32, earned: &HashSet<BadgeType>) -> Vec<BadgeType> {
    let milestones = [(7, BadgeType::WeekWarrior), (30, BadgeType::MonthMaster)];

    milestones
        .into_iter()
        .filter(|(threshold, id)| current_streak >= *threshold && !earned.contains(id))
        .map(|(_, id)| id)
        .collect()
}

/// Check level badges (3 badges)
pub fn check_level_badges(level: u32, earned: &HashSet<BadgeType>) -> Vec<BadgeType> {
    let mut newly_earned = Vec::new();

    let milestones = [
        (10, BadgeType::Level10),
        (25, BadgeType::Level25),
        (50, BadgeType::Level50),
    ];

    for (threshold, id) in milestones {
        if level >= threshold && !earned.contains(&id) {
            newly_earned.push(id);
        }
    }

    newly_earned
}

/// Check completion-count badges (first_day, century_club)
pub fn check_milestone_badges(completed_total: usize, earned: &HashSet<BadgeType>) -> Vec<BadgeType> {
    let mut newly_earned = Vec::new();

    let milestones = [(1, BadgeType::FirstDay), (100, BadgeType::CenturyClub)];

    for (threshold, id) in milestones {
        if completed_total >= threshold && !earned.contains(&id) {
            newly_earned.push(id);
        }
    }

    newly_earned
}

/// True when every active habit has a completed entry among `completions`.
/// A user with no active habits never has a perfect day.
pub fn is_perfect_day(habits: &[Habit], completions: &[HabitCompletion]) -> bool {
    let done: HashSet<&HabitId> = completions
        .iter()
        .filter(|c| c.completed)
        .map(|c| &c.habit_id)
        .collect();

    let mut active = habits.iter().filter(|h| h.is_active()).peekable();
    if active.peek().is_none() {
        return false;
    }
    active.all(|h| done.contains(&h.id))
}

/// Check the perfect-day badge against today's completions
pub fn check_perfect_day(
    habits: &[Habit],
    today_completions: &[HabitCompletion],
    earned: &HashSet<BadgeType>,
) -> Vec<BadgeType> {
    if earned.contains(&BadgeType::PerfectDay) || !is_perfect_day(habits, today_completions) {
        return Vec::new();
    }
    vec![BadgeType::PerfectDay]
}

/// Check the perfect-week badge: the 7 days ending `today` were all perfect
pub fn check_perfect_week(
    habits: &[Habit],
    history: &[HabitCompletion],
    today: NaiveDate,
    earned: &HashSet<BadgeType>,
) -> Vec<BadgeType> {
    if earned.contains(&BadgeType::PerfectWeek) {
        return Vec::new();
    }

    let days: BTreeSet<NaiveDate> = (0..7)
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect();
    if days.len() < 7 {
        return Vec::new();
    }

    let all_perfect = days.iter().all(|day| {
        let on_day: Vec<HabitCompletion> = history
            .iter()
            .filter(|c| c.completion_date == *day)
            .cloned()
            .collect();
        is_perfect_day(habits, &on_day)
    });

    if all_perfect {
        vec![BadgeType::PerfectWeek]
    } else {
        Vec::new()
    }
}

/// Check early_bird / night_owl from the local hours at which today's
/// habits were completed
pub fn check_time_of_day_badges(
    completion_hours: &[u32],
    earned: &HashSet<BadgeType>,
) -> Vec<BadgeType> {
    let mut newly_earned = Vec::new();

    let early = completion_hours
        .iter()
        .filter(|h| **h < EARLY_BIRD_BEFORE_HOUR)
        .count();
    let late = completion_hours
        .iter()
        .filter(|h| **h >= NIGHT_OWL_FROM_HOUR)
        .count();

    if early >= 5 && !earned.contains(&BadgeType::EarlyBird) {
        newly_earned.push(BadgeType::EarlyBird);
    }
    if late >= 5 && !earned.contains(&BadgeType::NightOwl) {
        newly_earned.push(BadgeType::NightOwl);
    }

    newly_earned
}
