//! CLI command implementations

pub mod badges;
pub mod habit;
pub mod init;
pub mod progress;
pub mod status;
pub mod toggle;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use habitual::config::Config;
use habitual::gamification::GamificationEngine;
use habitual::store::{HabitStore, SqliteStore, Stores};
use habitual::{Habit, User, UserId};

/// Global flags shared by every command
pub struct AppOptions {
    pub user: String,
    pub db: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl AppOptions {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.user.clone())
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load_from(self.config.as_deref())
    }
}

/// Opened database, engine and current user for one command
pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub engine: GamificationEngine,
    pub user: User,
}

impl AppContext {
    /// Load config, open the database and make sure the user row exists
    pub fn open(options: &AppOptions) -> Result<Self> {
        let config = options.load_config()?;
        let db_path = options.db.clone().unwrap_or_else(|| config.database_path());

        let store = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database: {}", db_path.display()))?,
        );
        let user = store
            .ensure_user(&options.user_id(), None)
            .context("Failed to load user")?;

        let engine = GamificationEngine::with_system_clock(
            Stores::from_backend(store.clone()),
            config.gamification.clone(),
        );

        Ok(Self {
            config,
            store,
            engine,
            user,
        })
    }

    /// Find a habit by id, or by name ignoring case
    pub async fn find_habit(&self, key: &str) -> Result<Habit> {
        let habits = self
            .store
            .get_habits(&self.user.id)
            .await
            .context("Failed to load habits")?;

        if let Some(habit) = habits.iter().find(|h| h.id.as_str() == key) {
            return Ok(habit.clone());
        }

        let matches: Vec<&Habit> = habits
            .iter()
            .filter(|h| h.name.eq_ignore_ascii_case(key))
            .collect();
        match matches.as_slice() {
            [habit] => Ok((*habit).clone()),
            [] => bail!("No habit named '{}'", key),
            _ => bail!("Several habits are named '{}', use the id instead", key),
        }
    }
}

/// Shorten `s` to `max` characters for table output
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
