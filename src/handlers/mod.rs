//! CLI command handlers.

pub mod import;
pub mod init;
pub mod list;
pub mod seed;
pub mod show;
pub mod status;
pub mod whoami;

use chrono::DateTime;
use colored::Colorize;
use taskfi::engine::state::{DerivedTaskView, UiStatus};
use taskfi::engine::types::Identity;

pub const TOKEN_SYMBOL: &str = "ETH";

/// Who is looking, and when.
pub struct Session {
    pub viewer: Option<Identity>,
    /// Unix seconds used for every classification in this run.
    pub now: i64,
}

impl Session {
    #[must_use]
    pub fn viewer(&self) -> Option<&Identity> {
        self.viewer.as_ref()
    }

    #[must_use]
    pub fn viewer_label(&self) -> String {
        self.viewer
            .as_ref()
            .map_or_else(|| "(not connected)".to_string(), Identity::short)
    }
}

pub fn status_icon(status: UiStatus) -> colored::ColoredString {
    match status {
        UiStatus::Active => "○".blue(),
        UiStatus::InReview => "…".yellow(),
        UiStatus::Completed => "✓".green(),
        UiStatus::Failed => "✗".red(),
    }
}

pub fn status_label(status: UiStatus) -> colored::ColoredString {
    match status {
        UiStatus::Active => status.label().blue(),
        UiStatus::InReview => status.label().yellow(),
        UiStatus::Completed => status.label().green(),
        UiStatus::Failed => status.label().red(),
    }
}

/// Action names offered by a view, in display order.
#[must_use]
pub fn action_labels(view: &DerivedTaskView) -> Vec<&'static str> {
    let mut actions = Vec::new();
    if view.can_submit_proof {
        actions.push("submit proof");
    }
    if view.can_claim_own {
        actions.push("claim stake");
    }
    if view.can_claim_as_other {
        actions.push("claim forfeit");
    }
    actions
}

/// Absolute UTC time plus distance from `now`.
#[must_use]
pub fn describe_deadline(deadline: i64, now: i64) -> String {
    let absolute = DateTime::from_timestamp(deadline, 0).map_or_else(
        || format!("@{deadline}"),
        |t| t.format("%Y-%m-%d %H:%M UTC").to_string(),
    );
    let delta = deadline.saturating_sub(now);
    let relative = if delta >= 0 {
        format!("in {}", humanize(delta))
    } else {
        format!("{} ago", humanize(delta.saturating_neg()))
    };
    format!("{absolute} ({relative})")
}

fn humanize(secs: i64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;
    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{secs}s")
    }
}
