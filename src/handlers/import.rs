//! Handler for the `import` command.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use taskfi::engine::config::Config;
use taskfi::engine::db::{Db, DB_DIR};
use taskfi::engine::ingest::import_document;
use taskfi::engine::repo::TaskRepo;

/// Loads contract snapshots from a JSON file into the local store.
///
/// Accepts an array of snapshots or a single object. Rejected entries are
/// reported and skipped; the rest are stored in one transaction.
///
/// # Errors
/// Returns error if the file cannot be read or parsed, or the commit fails.
pub fn handle(file: &Path) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let config = Config::load(Path::new(DB_DIR))?;
    let mut conn = Db::connect()?;
    let tx = conn.transaction()?;
    let report = import_document(&TaskRepo::new(&tx), &text, config.claim_detection)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    tx.commit()?;

    for (idx, reason) in &report.rejected {
        println!("   {} entry {idx}: {reason}", "✗".red());
    }
    println!(
        "{} Imported {}/{} snapshots from {}",
        "✓".green(),
        report.stored.len(),
        report.total,
        file.display()
    );
    Ok(())
}
