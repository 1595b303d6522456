//! TaskFi: derives the UI status and action eligibility of stake-to-commit
//! tasks from contract snapshots.

pub mod engine;
pub mod logging;
