//! Blocking dependency gate.
//!
//! The gate is advisory policy evaluated before a move: a task with
//! unfinished blockers may not enter a terminal column unless the caller
//! forces the move, and entering an active column only produces a warning.

use super::ColumnRole;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Warning attached to moves of blocked tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingWarning {
    /// Number of active blockers at evaluation time.
    pub blockers: usize,
}

impl fmt::Display for BlockingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task is blocked by {} unfinished task(s)", self.blockers)
    }
}

/// Outcome of the blocking gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Move freely.
    Allow,
    /// Move, but surface the warning.
    AllowWithWarning(BlockingWarning),
    /// Refuse unless forced.
    Deny(BlockingWarning),
}

/// Evaluates the gate for a move.
///
/// `target_role` is `None` for targets without a column (backlog and
/// sprint), which never gate.
#[must_use]
pub const fn evaluate_blocking(
    active_blockers: usize,
    target_role: Option<ColumnRole>,
) -> GateDecision {
    if active_blockers == 0 {
        return GateDecision::Allow;
    }
    let warning = BlockingWarning {
        blockers: active_blockers,
    };
    match target_role {
        Some(ColumnRole::Terminal) => GateDecision::Deny(warning),
        Some(ColumnRole::Active) => GateDecision::AllowWithWarning(warning),
        Some(ColumnRole::Initial) | None => GateDecision::Allow,
    }
}
