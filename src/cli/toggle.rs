//! Toggle command implementation

use anyhow::{Context, Result};
use chrono::NaiveDate;

use habitual::CompletionToggle;

use super::{AppContext, AppOptions};

pub struct ToggleArgs {
    pub habit: String,
    pub date: Option<String>,
    pub undo: bool,
    pub minutes: Option<u32>,
    pub note: Option<String>,
    pub json: bool,
}

/// Record a habit as done or not done and print what it earned
pub async fn toggle_command(options: &AppOptions, args: ToggleArgs) -> Result<()> {
    let mut ctx = AppContext::open(options)?;
    let habit = ctx.find_habit(&args.habit).await?;

    let date = match &args.date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", raw))?,
        None => ctx.engine.clock().today(),
    };

    let mut toggle = if args.undo {
        CompletionToggle::undone(habit.id.clone(), date)
    } else {
        CompletionToggle::done(habit.id.clone(), date)
    };
    toggle.actual_minutes = args.minutes;
    toggle.note = args.note;

    let outcome = ctx.engine.record_completion(&mut ctx.user, toggle).await?;

    if args.json {
        let body = serde_json::json!({
            "completion": outcome.completion,
            "events": outcome.events,
            "warnings": outcome.warnings,
            "user": ctx.user,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let mark = if outcome.completion.completed { "✓" } else { "✗" };
    println!("{} {} {} on {}", mark, habit.emoji, habit.name, date);
    for event in &outcome.events {
        println!("  {}", event);
    }
    for warning in &outcome.warnings {
        eprintln!("  warning: {}", warning);
    }

    Ok(())
}
