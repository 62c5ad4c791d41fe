use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "habitual")]
#[command(about = "Habit tracking with XP, levels, streaks and badges")]
#[command(version)]
struct Cli {
    /// User to act as
    #[arg(short, long, global = true, env = "HABITUAL_USER", default_value = "local")]
    user: String,

    /// Path to the SQLite database (defaults to the config value or ~/.habitual/habits.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Path to the config file (defaults to ~/.habitual/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file and create the database
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show level, XP, streak and today's habits
    Status,

    /// Manage habits
    Habit {
        #[command(subcommand)]
        command: HabitCommands,
    },

    /// Mark a habit done (or not done) for a day
    Toggle {
        /// Habit id or name
        habit: String,

        /// Day to record (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Mark as not done
        #[arg(long)]
        undo: bool,

        /// Minutes actually spent
        #[arg(long)]
        minutes: Option<u32>,

        /// Free-form note
        #[arg(long)]
        note: Option<String>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recompute the daily streak from history
    Streak,

    /// List earned badges
    Badges {
        /// Also show badges not yet earned
        #[arg(long)]
        all: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Grant XP manually
    Award {
        /// Amount of XP (must be positive)
        amount: u32,
    },

    /// Reset XP, level, streaks and badges (completions are kept)
    Reset {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum HabitCommands {
    /// Add a habit
    Add {
        /// Habit name
        name: String,

        /// Category, e.g. "📝 Productivity" or "💪 Health|color:3"
        #[arg(long, default_value = "📋 General")]
        category: String,

        /// Estimated minutes per session
        #[arg(long, default_value_t = 5)]
        minutes: u32,

        /// low, medium, high or critical
        #[arg(long)]
        importance: Option<String>,

        /// days, times, hours or minutes
        #[arg(long)]
        kpi: Option<String>,

        /// Weekly target (1-7)
        #[arg(long)]
        times_per_week: Option<u8>,
    },

    /// List habits
    List {
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = cli::AppOptions {
        user: cli.user,
        db: cli.db,
        config: cli.config,
    };

    match cli.command {
        Some(Commands::Init { force }) => {
            cli::init::init_command(&options, force).await?;
        }
        Some(Commands::Habit { command }) => match command {
            HabitCommands::Add {
                name,
                category,
                minutes,
                importance,
                kpi,
                times_per_week,
            } => {
                let args = cli::habit::AddHabitArgs {
                    name,
                    category,
                    minutes,
                    importance,
                    kpi,
                    times_per_week,
                };
                cli::habit::add(&options, args).await?;
            }
            HabitCommands::List { all } => {
                cli::habit::list(&options, all).await?;
            }
        },
        Some(Commands::Toggle {
            habit,
            date,
            undo,
            minutes,
            note,
            json,
        }) => {
            let args = cli::toggle::ToggleArgs {
                habit,
                date,
                undo,
                minutes,
                note,
                json,
            };
            cli::toggle::toggle_command(&options, args).await?;
        }
        Some(Commands::Streak) => {
            cli::progress::streak_command(&options).await?;
        }
        Some(Commands::Badges { all, json }) => {
            cli::badges::badges_command(&options, all, json).await?;
        }
        Some(Commands::Award { amount }) => {
            cli::progress::award_command(&options, amount).await?;
        }
        Some(Commands::Reset { yes }) => {
            cli::progress::reset_command(&options, yes).await?;
        }
        Some(Commands::Status) | None => {
            cli::status::status_command(&options).await?;
        }
    }

    Ok(())
}
