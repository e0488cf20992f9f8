//! Domain events emitted after committed placement changes.

use super::{BoardId, Container, Placement, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A task changed container or position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMoved {
    /// Moved task.
    pub task_id: TaskId,
    /// Board the task belongs to.
    pub board_id: BoardId,
    /// Placement before the move (may be orphaned for repairs).
    pub from: Placement,
    /// Container after the move.
    pub to: Container,
    /// User who triggered the move.
    pub actor: UserId,
    /// Commit time.
    pub occurred_at: DateTime<Utc>,
}

impl TaskMoved {
    /// Creates an event stamped with the current clock time.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        board_id: BoardId,
        from: Placement,
        to: Container,
        actor: UserId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            task_id,
            board_id,
            from,
            to,
            actor,
            occurred_at: clock.utc(),
        }
    }
}
