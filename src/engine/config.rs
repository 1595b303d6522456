//! Configuration: `.taskfi/config.json`.

use super::record::ClaimDetection;
use super::types::Identity;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const CONFIG_FILE: &str = "config.json";

/// Settings that describe the deployed contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Contract owner, allowed to act as admin.
    pub owner: Option<Identity>,
    /// How completed tasks are recognized as already claimed.
    pub claim_detection: ClaimDetection,
}

impl Config {
    /// Loads `config.json` from `dir`, falling back to defaults when absent.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Writes the configuration to `dir/config.json`.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(CONFIG_FILE);
        let text = serde_json::to_string_pretty(self)?;
        fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Replaces the owner when an override is given.
    #[must_use]
    pub fn with_owner(mut self, owner: Option<Identity>) -> Self {
        if owner.is_some() {
            self.owner = owner;
        }
        self
    }
}
