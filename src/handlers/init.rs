//! Handler for the `init` command.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use taskfi::engine::config::{Config, CONFIG_FILE};
use taskfi::engine::db::{Db, DB_DIR};
use taskfi::engine::types::Identity;
use tracing::info;

/// Initializes the `.taskfi` directory, database and config.
///
/// # Errors
/// Returns error if database initialization or config write fails.
pub fn handle(owner: Option<Identity>) -> Result<()> {
    let dir = Path::new(DB_DIR);
    Db::init(dir)?;

    if dir.join(CONFIG_FILE).exists() {
        info!("keeping existing config");
    } else {
        Config::default().with_owner(owner).save(dir)?;
    }

    println!("{} Initialized {DB_DIR}/state.db", "✓".green());
    Ok(())
}
