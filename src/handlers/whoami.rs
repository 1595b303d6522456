//! Handler for the `whoami` command.

use super::Session;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use taskfi::engine::auth::AdminGate;
use taskfi::engine::config::Config;
use taskfi::engine::db::DB_DIR;
use taskfi::engine::types::Identity;

/// Prints the viewer identity and whether it is the contract owner.
///
/// # Errors
/// Returns error if the config file exists but is invalid.
pub fn handle(session: &Session, owner: Option<Identity>) -> Result<()> {
    let config = Config::load(Path::new(DB_DIR))?.with_owner(owner);
    let gate = AdminGate::new(config.owner.clone());

    println!("   Viewer: {}", session.viewer_label());
    match gate.owner() {
        Some(owner) => println!("   Owner:  {}", owner.short()),
        None => println!("   Owner:  {}", "(not configured)".dimmed()),
    }

    if gate.is_admin(session.viewer()) {
        println!("{} Viewer is the contract owner (admin).", "✓".green());
    } else {
        println!("{} Viewer has no admin rights.", "·".dimmed());
    }
    println!(
        "   Claim detection: {}",
        serde_json::to_string(&config.claim_detection)?.trim_matches('"')
    );
    Ok(())
}
