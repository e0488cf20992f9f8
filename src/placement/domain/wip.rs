//! Work-in-progress limit enforcement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of tasks a column may hold at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WipLimit(u32);

impl WipLimit {
    /// Creates a limit.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric limit.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    fn as_count(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for WipLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a WIP check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WipDecision {
    /// The insert fits.
    Allow,
    /// The insert would exceed the limit.
    Deny {
        /// Tasks currently in the container.
        current: usize,
        /// Configured limit.
        limit: WipLimit,
    },
}

/// Checks a container's limit against the task count after an insert.
///
/// Containers without a limit always allow. Callers must evaluate and write
/// inside one store transaction.
#[must_use]
pub fn evaluate_wip(limit: Option<WipLimit>, count_after_insert: usize) -> WipDecision {
    match limit {
        Some(limit) if count_after_insert > limit.as_count() => WipDecision::Deny {
            current: count_after_insert.saturating_sub(1),
            limit,
        },
        _ => WipDecision::Allow,
    }
}

/// Returns how many more tasks fit, or `None` when unbounded.
#[must_use]
pub fn available_slots(limit: Option<WipLimit>, current: usize) -> Option<usize> {
    limit.map(|value| value.as_count().saturating_sub(current))
}
