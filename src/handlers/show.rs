//! Handler for the `show` command.

use super::{action_labels, describe_deadline, status_icon, status_label, Session, TOKEN_SYMBOL};
use anyhow::{bail, Result};
use colored::Colorize;
use taskfi::engine::db::Db;
use taskfi::engine::repo::TaskRepo;
use taskfi::engine::source::{RepoSource, TaskSource};
use taskfi::engine::state::{Branch, TaskWithView};
use taskfi::engine::types::RawTaskRecord;

/// Shows one task and explains its status.
///
/// # Errors
/// Returns error if the task is unknown or the DB query fails.
pub fn handle(session: &Session, id: u64, json: bool) -> Result<()> {
    let conn = Db::connect()?;
    let source = RepoSource::new(TaskRepo::new(&conn));
    let Some(record) = source.fetch(id)? else {
        bail!("Task #{id} not found. Run `taskfi import` or `taskfi seed` first.");
    };

    let task = TaskWithView::new(record, session.now, session.viewer());
    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
        return Ok(());
    }

    let record = &task.record;
    let status = task.view.ui_status;
    println!(
        "{} #{} {}",
        status_icon(status),
        record.id.to_string().cyan().bold(),
        record.description
    );
    println!("   Status:   {} ({})", status_label(status), status.color_hint().dimmed());
    println!("   Creator:  {}", record.creator);
    println!("   Deposit:  {} {TOKEN_SYMBOL}", record.deposit);
    println!("   Deadline: {}", describe_deadline(record.deadline, session.now));
    if record.has_proof() {
        println!("   Proof:    {}", record.proof_reference);
    }
    println!();

    explain(task.branch, record);
    println!();
    print_actions(&task, session);

    Ok(())
}

fn explain(branch: Branch, record: &RawTaskRecord) {
    match branch {
        Branch::ReportedComplete => {
            println!("{} Contract approved the proof.", "reason:".green());
            if record.already_claimed {
                println!("         Stake has already been withdrawn.");
            }
        }
        Branch::ReportedFailed => {
            println!("{} Contract marked the task failed.", "reason:".red());
        }
        Branch::DeadlinePassed => {
            println!(
                "{} Deadline passed without approval; contract not yet updated.",
                "reason:".red()
            );
            if record.has_proof() {
                println!("         Proof was submitted but the task was never approved.");
            }
        }
        Branch::AwaitingReview => {
            println!("{} Proof submitted, awaiting approval.", "reason:".yellow());
        }
        Branch::AwaitingProof => {
            println!("{} No proof submitted yet.", "reason:".blue());
        }
    }
}

fn print_actions(task: &TaskWithView, session: &Session) {
    let Some(viewer) = session.viewer() else {
        println!("{}", "Connect a wallet (--viewer) to see available actions.".dimmed());
        return;
    };

    let relation = if viewer.matches(&task.record.creator) {
        "creator"
    } else {
        "third party"
    };
    let actions = action_labels(&task.view);
    if actions.is_empty() {
        println!("   Actions for {} ({relation}): {}", viewer.short(), "none".dimmed());
    } else {
        println!(
            "   Actions for {} ({relation}): {}",
            viewer.short(),
            actions.join(", ").cyan()
        );
    }
}
