//! Handler for the `status` command.

use super::{status_icon, Session};
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use taskfi::engine::db::Db;
use taskfi::engine::repo::TaskRepo;
use taskfi::engine::source::{RepoSource, TaskSource};
use taskfi::engine::state::{classify_all, StatusCounts, UiStatus};

#[derive(Serialize)]
struct StatusReport {
    now: i64,
    viewer: Option<String>,
    counts: StatusCounts,
    total: usize,
    actionable_for_viewer: usize,
}

/// Displays task counts per UI status.
///
/// # Errors
/// Returns error if database query fails.
pub fn handle(session: &Session, json: bool) -> Result<()> {
    let conn = Db::connect()?;
    let source = RepoSource::new(TaskRepo::new(&conn));
    let tasks = classify_all(source.fetch_all()?, session.now, session.viewer());

    let counts = StatusCounts::tally(tasks.iter().map(|t| &t.view));
    let actionable = tasks.iter().filter(|t| t.view.has_action()).count();

    if json {
        let report = StatusReport {
            now: session.now,
            viewer: session.viewer.as_ref().map(ToString::to_string),
            total: counts.total(),
            counts,
            actionable_for_viewer: actionable,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} TaskFi Status", "📊".cyan());
    for status in UiStatus::ALL {
        println!(
            "   {} {:<10} {}",
            status_icon(status),
            status.label(),
            counts.get(status)
        );
    }
    println!("   {:<12} {}", "total", counts.total());
    println!();
    println!(
        "   Viewer {}: {} task(s) with actions",
        session.viewer_label().dimmed(),
        actionable
    );

    Ok(())
}
