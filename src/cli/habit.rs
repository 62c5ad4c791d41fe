//! Habit commands

use anyhow::{anyhow, Context, Result};

use habitual::store::HabitStore;
use habitual::{Category, Habit, Importance, KpiType};

use super::{truncate, AppContext, AppOptions};

pub struct AddHabitArgs {
    pub name: String,
    pub category: String,
    pub minutes: u32,
    pub importance: Option<String>,
    pub kpi: Option<String>,
    pub times_per_week: Option<u8>,
}

/// Add a habit at the end of the user's list
pub async fn add(options: &AppOptions, args: AddHabitArgs) -> Result<()> {
    let ctx = AppContext::open(options)?;

    let mut habit = Habit::new(
        ctx.user.id.clone(),
        args.name.trim(),
        Category::parse_legacy(&args.category),
    );
    habit.estimated_minutes = args.minutes;

    if let Some(importance) = args.importance {
        habit.importance = Some(
            Importance::parse(&importance)
                .ok_or_else(|| anyhow!("Invalid importance: {}", importance))?,
        );
    }
    if let Some(kpi) = args.kpi {
        habit.kpi_type =
            Some(KpiType::parse(&kpi).ok_or_else(|| anyhow!("Invalid KPI type: {}", kpi))?);
    }
    if let Some(times) = args.times_per_week {
        if !(1..=7).contains(&times) {
            return Err(anyhow!("times-per-week must be between 1 and 7"));
        }
        habit.times_per_week = Some(times);
    }

    let existing = ctx
        .store
        .get_habits(&ctx.user.id)
        .await
        .context("Failed to load habits")?;
    habit.order_index = existing
        .iter()
        .map(|h| h.order_index + 1)
        .max()
        .unwrap_or(0);

    let habit = ctx
        .store
        .create_habit(&habit)
        .await
        .context("Failed to save habit")?;
    println!("Added {} {} ({})", habit.emoji, habit.name, habit.id);

    Ok(())
}

/// List habits in display order
pub async fn list(options: &AppOptions, include_archived: bool) -> Result<()> {
    let ctx = AppContext::open(options)?;
    let habits: Vec<Habit> = ctx
        .store
        .get_habits(&ctx.user.id)
        .await
        .context("Failed to load habits")?
        .into_iter()
        .filter(|h| include_archived || h.is_active())
        .collect();

    if habits.is_empty() {
        println!("No habits yet. Add one with `habitual habit add <name>`.");
        return Ok(());
    }

    println!(
        "{:<36} {:<28} {:<22} {:>5} {:<10}",
        "ID", "NAME", "CATEGORY", "MIN", "IMPORTANCE"
    );
    println!("{}", "-".repeat(105));

    for h in &habits {
        let name = if h.is_archived {
            format!("{} {} (archived)", h.emoji, h.name)
        } else {
            format!("{} {}", h.emoji, h.name)
        };
        println!(
            "{:<36} {:<28} {:<22} {:>5} {:<10}",
            h.id,
            truncate(&name, 26),
            truncate(&h.category.name, 20),
            h.estimated_minutes,
            h.importance.map(|i| i.as_str()).unwrap_or("-"),
        );
    }

    println!("\nTotal: {} habits", habits.len());
    Ok(())
}
