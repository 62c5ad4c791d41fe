//! Init command implementation

use anyhow::{bail, Context, Result};
use tracing::info;

use habitual::config::Config;
use habitual::store::SqliteStore;

use super::AppOptions;

/// Write the default config and create the database with the current user
pub async fn init_command(options: &AppOptions, force: bool) -> Result<()> {
    let config_path = options
        .config
        .clone()
        .unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    config.save_to_file(&config_path)?;
    println!("Created: {}", config_path.display());

    let db_path = options.db.clone().unwrap_or_else(|| config.database_path());
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to create database: {}", db_path.display()))?;
    let user = store.ensure_user(&options.user_id(), None)?;
    info!("Database ready at {}", db_path.display());
    println!("Database: {} (user '{}')", db_path.display(), user.id);

    Ok(())
}
