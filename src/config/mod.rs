//! Configuration loading and management

mod io;
mod settings;

pub use settings::{GamificationSettings, StoreSettings};

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// XP, streak and badge settings
    #[serde(default)]
    pub gamification: GamificationSettings,

    /// Local database settings
    #[serde(default)]
    pub store: StoreSettings,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Path of the SQLite database, with `~/` expanded
    pub fn database_path(&self) -> PathBuf {
        match &self.store.database_path {
            Some(path) => expand_home(path),
            None => Self::global_config_dir().join("habits.db"),
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.gamification.xp_per_habit, 10);
        assert_eq!(config.gamification.streak_lookback_days, 3650);
        assert!(!config.gamification.count_pending_today);
    }

    #[test]
    fn test_partial_section() {
        let config: Config = toml::from_str(
            r#"
[gamification]
count_pending_today = true
"#,
        )
        .unwrap();
        assert!(config.gamification.count_pending_today);
        assert_eq!(config.gamification.xp_per_habit, 10);

        let policy = config.gamification.streak_policy();
        assert!(policy.count_pending_today);
        assert_eq!(policy.lookback_days, 3650);
    }

    #[test]
    fn test_database_path() {
        let config: Config = toml::from_str(
            r#"
[store]
database_path = "/tmp/habits-test.db"
"#,
        )
        .unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/habits-test.db"));

        let default = Config::default();
        assert!(default.database_path().ends_with(".habitual/habits.db"));
    }

    #[test]
    fn test_home_expansion() {
        let expanded = expand_home(Path::new("~/data/habits.db"));
        assert!(expanded.ends_with("data/habits.db"));
        assert!(!expanded.starts_with("~"));
    }
}
