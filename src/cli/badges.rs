//! Badges command implementation

use std::collections::HashMap;

use anyhow::{Context, Result};

use habitual::gamification::{Badge, BadgeCategory};
use habitual::store::AchievementStore;

use super::{AppContext, AppOptions};

/// Show earned badges grouped by category
pub async fn badges_command(options: &AppOptions, all: bool, json: bool) -> Result<()> {
    let ctx = AppContext::open(options)?;
    let achievements = ctx
        .store
        .get_achievements(&ctx.user.id)
        .await
        .context("Failed to load achievements")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&achievements)?);
        return Ok(());
    }

    let earned: HashMap<_, _> = achievements
        .iter()
        .map(|a| (a.badge_type, a.earned_at))
        .collect();

    if earned.is_empty() && !all {
        println!("No badges yet. Complete a habit to earn your first one.");
        return Ok(());
    }

    let categories = [
        BadgeCategory::Milestone,
        BadgeCategory::Streak,
        BadgeCategory::Completion,
        BadgeCategory::Special,
    ];

    for category in categories {
        let badges: Vec<&Badge> = Badge::by_category(category)
            .filter(|b| all || earned.contains_key(&b.badge_type))
            .collect();
        if badges.is_empty() {
            continue;
        }

        println!("{}", category.label());
        for badge in badges {
            match earned.get(&badge.badge_type) {
                Some(at) => println!(
                    "  {} {:<14} {} (earned {})",
                    badge.icon,
                    badge.name,
                    badge.description,
                    at.format("%Y-%m-%d")
                ),
                None => println!("  🔒 {:<14} {}", badge.name, badge.description),
            }
        }
        println!();
    }

    println!("Earned: {}/{}", earned.len(), habitual::gamification::BADGES.len());
    Ok(())
}
