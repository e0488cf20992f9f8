//! Predefined template tasks owned by a board.

use super::{BoardId, Container, Position, Task, TaskDetails, TemplateId};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A predefined item that can be materialized into concrete tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTask {
    id: TemplateId,
    board_id: BoardId,
    details: TaskDetails,
    order: u32,
}

impl TemplateTask {
    /// Creates a template at the given template order.
    #[must_use]
    pub fn new(board_id: BoardId, details: TaskDetails, order: u32) -> Self {
        Self::from_parts(TemplateId::new(), board_id, details, order)
    }

    /// Reconstructs a template from persisted parts.
    #[must_use]
    pub const fn from_parts(
        id: TemplateId,
        board_id: BoardId,
        details: TaskDetails,
        order: u32,
    ) -> Self {
        Self {
            id,
            board_id,
            details,
            order,
        }
    }

    /// Returns the template identifier.
    #[must_use]
    pub const fn id(&self) -> TemplateId {
        self.id
    }

    /// Returns the owning board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the template's task fields.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the template order.
    #[must_use]
    pub const fn order(&self) -> u32 {
        self.order
    }

    /// Creates a new concrete task from this template.
    #[must_use]
    pub fn instantiate(
        &self,
        container: Container,
        position: Position,
        clock: &impl Clock,
    ) -> Task {
        Task::new_in(self.board_id, self.details.clone(), container, position, clock)
    }
}
