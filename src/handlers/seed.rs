//! Handler for the `seed` command.

use super::Session;
use anyhow::Result;
use colored::Colorize;
use taskfi::engine::db::Db;
use taskfi::engine::repo::TaskRepo;
use taskfi::engine::source::{MockSource, TaskSource};

/// Stores the demo task set, with deadlines placed around the session time.
///
/// # Errors
/// Returns error if the database write fails.
pub fn handle(session: &Session) -> Result<()> {
    let mut conn = Db::connect()?;
    let tx = conn.transaction()?;
    let repo = TaskRepo::new(&tx);

    let records = MockSource::dummy(session.now).fetch_all()?;
    for record in &records {
        repo.upsert(record)?;
    }
    tx.commit()?;

    println!("{} Seeded {} demo tasks", "✓".green(), records.len());
    Ok(())
}
