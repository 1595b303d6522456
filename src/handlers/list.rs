//! Handler for the `list` command.

use super::{action_labels, status_icon, Session, TOKEN_SYMBOL};
use anyhow::Result;
use colored::Colorize;
use taskfi::engine::db::Db;
use taskfi::engine::repo::TaskRepo;
use taskfi::engine::source::{RepoSource, TaskSource};
use taskfi::engine::state::{classify_all, TaskWithView, UiStatus};

/// Lists all tasks with their derived status for the viewer.
///
/// # Errors
/// Returns error if database query fails.
pub fn handle(session: &Session, json: bool, filter: Option<UiStatus>) -> Result<()> {
    let conn = Db::connect()?;
    let source = RepoSource::new(TaskRepo::new(&conn));
    let tasks: Vec<TaskWithView> = classify_all(source.fetch_all()?, session.now, session.viewer())
        .into_iter()
        .filter(|t| filter.map_or(true, |s| t.view.ui_status == s))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    print_human(&tasks, session);
    Ok(())
}

fn print_human(tasks: &[TaskWithView], session: &Session) {
    println!("{} Tasks (viewer: {})", "📋".cyan(), session.viewer_label().dimmed());

    if tasks.is_empty() {
        println!("   (No tasks)");
        return;
    }

    for task in tasks {
        let record = &task.record;
        println!(
            "   {} #{} {} ({} {TOKEN_SYMBOL}, {})",
            status_icon(task.view.ui_status),
            record.id.to_string().yellow(),
            record.description,
            record.deposit,
            task.view.ui_status.to_string().dimmed()
        );

        let actions = action_labels(&task.view);
        if !actions.is_empty() {
            println!("      ➜ {}", actions.join(", ").cyan());
        }
    }
}
