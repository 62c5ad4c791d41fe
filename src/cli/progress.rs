//! Streak, XP and reset commands

use anyhow::{bail, Context, Result};

use super::{AppContext, AppOptions};

/// Recompute the streak and print it
pub async fn streak_command(options: &AppOptions) -> Result<()> {
    let mut ctx = AppContext::open(options)?;
    let update = ctx.engine.recompute_streak(&mut ctx.user).await?;

    println!("🔥 Current streak: {} days", update.current_streak);
    println!("   Longest streak: {} days", update.longest_streak);
    if update.current_streak == 0 && !ctx.config.gamification.count_pending_today {
        println!("   Complete a habit today to start a new streak.");
    }
    Ok(())
}

/// Grant XP outside the completion flow
pub async fn award_command(options: &AppOptions, amount: u32) -> Result<()> {
    let mut ctx = AppContext::open(options)?;
    let events = ctx.engine.award_xp(&mut ctx.user, amount).await?;

    for event in &events {
        println!("{}", event);
    }
    Ok(())
}

/// Zero XP, level, streaks and badges for the user
pub async fn reset_command(options: &AppOptions, yes: bool) -> Result<()> {
    if !yes {
        bail!("This erases XP, level, streaks and badges for '{}'.\nRun again with --yes to confirm.", options.user);
    }

    let ctx = AppContext::open(options)?;
    ctx.store
        .reset_progress(&ctx.user.id)
        .context("Failed to reset progress")?;
    println!("Progress reset for '{}'.", ctx.user.id);
    Ok(())
}
