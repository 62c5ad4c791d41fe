//! Status command implementation

use anyhow::Result;

use habitual::cache::DayCache;
use habitual::gamification::{LevelProgress, MAX_DISPLAY_LEVEL};

use super::{AppContext, AppOptions};

/// Show level progress, streak and today's checklist
pub async fn status_command(options: &AppOptions) -> Result<()> {
    let ctx = AppContext::open(options)?;
    let today = ctx.engine.clock().today();

    let mut day = DayCache::new(ctx.user.id.clone(), today);
    if !day.load(ctx.engine.stores()).await {
        eprintln!("warning: some data could not be loaded, showing what is available");
    }
    let user = day.user().unwrap_or(&ctx.user);

    let progress = LevelProgress::for_xp(user.total_xp);
    if progress.is_max_display_level() {
        println!(
            "Level {}+  [{}]  {} XP",
            MAX_DISPLAY_LEVEL,
            "#".repeat(20),
            progress.total_xp
        );
    } else {
        let filled = (progress.progress_to_next() * 20.0).round() as usize;
        println!(
            "Level {}  [{}{}]  {} XP ({} to next)",
            progress.level,
            "#".repeat(filled),
            "-".repeat(20 - filled.min(20)),
            progress.total_xp,
            progress.xp_to_next()
        );
    }
    println!(
        "Streak: {} days (longest {})",
        user.current_streak, user.longest_streak
    );
    println!();

    let habits: Vec<_> = day.active_habits().collect();
    if habits.is_empty() {
        println!("No habits yet. Add one with `habitual habit add <name>`.");
        return Ok(());
    }

    println!("Today ({}):", today);
    for habit in &habits {
        let mark = if day.is_completed(&habit.id) { "[x]" } else { "[ ]" };
        println!("  {} {} {}", mark, habit.emoji, habit.name);
    }
    println!(
        "\n{}/{} done{}",
        day.completed_count(),
        habits.len(),
        if day.is_perfect_day() { " - perfect day!" } else { "" }
    );

    Ok(())
}
