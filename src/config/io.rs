//! Configuration file I/O operations

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::Config;

const CONFIG_HEADER: &str = "# habitual configuration\n# Remove a key to fall back to its default.\n\n";

impl Config {
    /// Get the global config directory path (~/.habitual/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".habitual")
    }

    /// Get the global config file path (~/.habitual/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Write the config to `path`, creating parent directories.
    ///
    /// A concurrent `init` fails on the lock instead of waiting for it.
    /// The content is staged next to the target and renamed into place.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let lock_path = path.with_extension("toml.lock");
        let lock = File::create(&lock_path)
            .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;
        FileExt::try_lock_exclusive(&lock)
            .with_context(|| format!("Another process is writing {}", path.display()))?;

        let body = toml::to_string_pretty(self).context("Failed to serialize config")?;
        let staged = path.with_extension("toml.tmp");
        std::fs::write(&staged, format!("{}{}", CONFIG_HEADER, body))
            .with_context(|| format!("Failed to write {}", staged.display()))?;
        std::fs::rename(&staged, path)
            .with_context(|| format!("Failed to move config into place: {}", path.display()))?;

        Ok(())
    }

    /// Load `path`, or the global config when `path` is `None`.
    /// A missing file yields the defaults.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::global_config_path(),
        };

        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }
}
