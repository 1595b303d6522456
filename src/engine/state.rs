//! Status & Eligibility Resolver: Computes the UI status of a task.
//!
//! This module answers "what should the viewer see for this task right
//! now, and what may they do?" from a contract snapshot, the current time
//! and the viewer's identity.
//!
//! Everything here is pure: no I/O, no logging, no clock reads. The
//! caller supplies `now` so results are reproducible.

use super::types::{CoarseStatus, Identity, RawTaskRecord};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The derived (computed) status of a task.
///
/// Unlike `CoarseStatus` (reported by the contract), `UiStatus` also
/// separates tasks awaiting review and infers expiry ahead of the
/// contract's own bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UiStatus {
    /// Deadline ahead, no proof yet
    Active,
    /// Proof submitted, awaiting approval
    InReview,
    /// Approved by the contract
    Completed,
    /// Reported failed, or deadline passed without approval
    Failed,
}

impl UiStatus {
    pub const ALL: [UiStatus; 4] = [
        UiStatus::Active,
        UiStatus::InReview,
        UiStatus::Completed,
        UiStatus::Failed,
    ];

    /// Returns the display color hint for UI rendering.
    #[must_use]
    pub fn color_hint(&self) -> &'static str {
        match self {
            UiStatus::Active => "blue",
            UiStatus::InReview => "amber",
            UiStatus::Completed => "green",
            UiStatus::Failed => "red",
        }
    }

    /// Returns true if the creator still has work to do on this task.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        matches!(self, UiStatus::Active)
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            UiStatus::Active => "active",
            UiStatus::InReview => "in-review",
            UiStatus::Completed => "completed",
            UiStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for UiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UiStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "active" => Ok(UiStatus::Active),
            "in-review" | "inreview" | "review" => Ok(UiStatus::InReview),
            "completed" | "complete" => Ok(UiStatus::Completed),
            "failed" => Ok(UiStatus::Failed),
            other => Err(format!(
                "unknown status '{other}' (expected active, in-review, completed or failed)"
            )),
        }
    }
}

/// Which decision branch produced a task's status.
///
/// Exposed so display code can explain a status without re-deriving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    /// Contract reports `Complete`
    ReportedComplete,
    /// Contract reports `Failed`
    ReportedFailed,
    /// Contract still reports `InProgress` but the deadline is behind us
    DeadlinePassed,
    /// Proof submitted, deadline not yet passed
    AwaitingReview,
    /// No proof, deadline not yet passed
    AwaitingProof,
}

impl Branch {
    #[must_use]
    pub fn ui_status(self) -> UiStatus {
        match self {
            Branch::ReportedComplete => UiStatus::Completed,
            Branch::ReportedFailed | Branch::DeadlinePassed => UiStatus::Failed,
            Branch::AwaitingReview => UiStatus::InReview,
            Branch::AwaitingProof => UiStatus::Active,
        }
    }
}

/// Picks the decision branch for a snapshot. First match wins.
///
/// A passed deadline outranks a submitted proof: late proof does not
/// rescue a task.
#[must_use]
pub fn branch(record: &RawTaskRecord, now: i64) -> Branch {
    match record.coarse_status {
        CoarseStatus::Complete => Branch::ReportedComplete,
        CoarseStatus::Failed => Branch::ReportedFailed,
        CoarseStatus::InProgress if record.deadline < now => Branch::DeadlinePassed,
        CoarseStatus::InProgress if record.has_proof() => Branch::AwaitingReview,
        CoarseStatus::InProgress => Branch::AwaitingProof,
    }
}

/// UI status plus the advisory action flags for one viewer.
///
/// The contract remains the authority: a flag set here may still be
/// refused on-chain if state moved since the snapshot was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DerivedTaskView {
    pub ui_status: UiStatus,
    pub can_submit_proof: bool,
    pub can_claim_own: bool,
    pub can_claim_as_other: bool,
}

impl DerivedTaskView {
    fn status_only(ui_status: UiStatus) -> Self {
        Self {
            ui_status,
            can_submit_proof: false,
            can_claim_own: false,
            can_claim_as_other: false,
        }
    }

    /// Returns true if any action is offered to the viewer.
    #[must_use]
    pub fn has_action(&self) -> bool {
        self.can_submit_proof || self.can_claim_own || self.can_claim_as_other
    }
}

/// Classifies a task snapshot for a viewer at time `now`.
///
/// This is a pure function: same inputs, same output. An absent viewer
/// gets the status with every flag false.
///
/// # Arguments
/// * `record` - The snapshot to evaluate (`deadline > 0`)
/// * `now` - Current Unix time in seconds
/// * `viewer` - Connected wallet, if any
#[must_use]
pub fn classify(record: &RawTaskRecord, now: i64, viewer: Option<&Identity>) -> DerivedTaskView {
    let branch = branch(record, now);
    let mut view = DerivedTaskView::status_only(branch.ui_status());

    let Some(viewer) = viewer else {
        return view;
    };
    let is_creator = viewer.matches(&record.creator);

    match branch {
        Branch::ReportedComplete => {
            view.can_claim_own = is_creator && !record.already_claimed;
        }
        Branch::ReportedFailed | Branch::DeadlinePassed => {
            view.can_claim_as_other = !is_creator;
        }
        Branch::AwaitingReview => {}
        Branch::AwaitingProof => {
            // Recheck the deadline even though the branch implies it.
            view.can_submit_proof = is_creator && record.deadline > now;
        }
    }

    view
}

/// A snapshot with its view pre-computed.
///
/// Useful for list rendering where both are needed.
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithView {
    #[serde(flatten)]
    pub record: RawTaskRecord,
    pub branch: Branch,
    #[serde(flatten)]
    pub view: DerivedTaskView,
}

impl TaskWithView {
    #[must_use]
    pub fn new(record: RawTaskRecord, now: i64, viewer: Option<&Identity>) -> Self {
        let branch = branch(&record, now);
        let view = classify(&record, now, viewer);
        Self {
            record,
            branch,
            view,
        }
    }
}

/// Batch-classifies snapshots against a single `now`.
#[must_use]
pub fn classify_all(
    records: Vec<RawTaskRecord>,
    now: i64,
    viewer: Option<&Identity>,
) -> Vec<TaskWithView> {
    records
        .into_iter()
        .map(|record| TaskWithView::new(record, now, viewer))
        .collect()
}

/// Aggregate counts of tasks by UI status.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub active: usize,
    pub in_review: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StatusCounts {
    #[must_use]
    pub fn tally<'a>(views: impl IntoIterator<Item = &'a DerivedTaskView>) -> Self {
        let mut counts = Self::default();
        for view in views {
            counts.add(view.ui_status);
        }
        counts
    }

    pub fn add(&mut self, status: UiStatus) {
        match status {
            UiStatus::Active => self.active += 1,
            UiStatus::InReview => self.in_review += 1,
            UiStatus::Completed => self.completed += 1,
            UiStatus::Failed => self.failed += 1,
        }
    }

    #[must_use]
    pub fn get(&self, status: UiStatus) -> usize {
        match status {
            UiStatus::Active => self.active,
            UiStatus::InReview => self.in_review,
            UiStatus::Completed => self.completed,
            UiStatus::Failed => self.failed,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.active + self.in_review + self.completed + self.failed
    }
}
