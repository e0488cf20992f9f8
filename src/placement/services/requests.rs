//! Request and response types for placement services.

use crate::placement::domain::{
    Actor, BlockingWarning, BoardId, Classification, Container, ContainerTarget, Estimate,
    InsertAnchor, PlacementDomainError, PlacementRefs, Position, Priority, Task, TaskId, TaskType,
    TemplateId,
};
use std::fmt;
use uuid::Uuid;

/// Request to move a task into a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTaskRequest {
    pub(crate) actor: Actor,
    pub(crate) task_id: TaskId,
    pub(crate) target: ContainerTarget,
    pub(crate) anchor: InsertAnchor,
    pub(crate) force: bool,
}

impl MoveTaskRequest {
    /// Creates a request that appends the task at the end of `target`.
    #[must_use]
    pub fn new(actor: Actor, task_id: TaskId, target: impl Into<ContainerTarget>) -> Self {
        Self {
            actor,
            task_id,
            target: target.into(),
            anchor: InsertAnchor::End,
            force: false,
        }
    }

    /// Creates a request from the wire form of a target.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementDomainError`] when the type string is unknown or
    /// the identifier does not fit the type.
    pub fn parse(
        actor: Actor,
        task_id: TaskId,
        container_type: &str,
        container_id: Option<Uuid>,
    ) -> Result<Self, PlacementDomainError> {
        let target = ContainerTarget::parse(container_type, container_id)?;
        Ok(Self::new(actor, task_id, target))
    }

    /// Places the task immediately after `anchor`.
    #[must_use]
    pub const fn after(mut self, anchor: TaskId) -> Self {
        self.anchor = InsertAnchor::After(anchor);
        self
    }

    /// Places the task before every other task.
    #[must_use]
    pub const fn at_start(mut self) -> Self {
        self.anchor = InsertAnchor::Start;
        self
    }

    /// Overrides a blocking denial.
    #[must_use]
    pub const fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Returns the task being moved.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the requested target.
    #[must_use]
    pub const fn target(&self) -> ContainerTarget {
        self.target
    }

    /// Returns the insert anchor.
    #[must_use]
    pub const fn anchor(&self) -> InsertAnchor {
        self.anchor
    }

    /// Returns whether a blocking denial is overridden.
    #[must_use]
    pub const fn force(&self) -> bool {
        self.force
    }
}

/// Result of a committed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Task as committed.
    pub task: Task,
    /// Classification of the committed placement.
    pub classification: Classification,
    /// Blocking warning, present for active-column moves and forced moves.
    pub warning: Option<BlockingWarning>,
    /// Task now immediately before the moved one.
    pub preceding: Option<TaskId>,
    /// Whether other tasks in the container were renumbered.
    pub renumbered: bool,
}

/// Request to create a task in a board's backlog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub(crate) board_id: BoardId,
    pub(crate) title: String,
    pub(crate) task_type: TaskType,
    pub(crate) priority: Priority,
    pub(crate) estimate: Option<Estimate>,
}

impl CreateTaskRequest {
    /// Creates a request with default type and priority.
    #[must_use]
    pub fn new(board_id: BoardId, title: impl Into<String>) -> Self {
        Self {
            board_id,
            title: title.into(),
            task_type: TaskType::default(),
            priority: Priority::default(),
            estimate: None,
        }
    }

    /// Sets the task type.
    #[must_use]
    pub const fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the estimate.
    #[must_use]
    pub const fn with_estimate(mut self, estimate: Estimate) -> Self {
        self.estimate = Some(estimate);
        self
    }
}

/// Partial update of descriptive task fields.
///
/// Fields left unset keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDetailsUpdate {
    pub(crate) title: Option<String>,
    pub(crate) task_type: Option<TaskType>,
    pub(crate) priority: Option<Priority>,
    pub(crate) estimate: Option<Option<Estimate>>,
}

impl TaskDetailsUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the task type.
    #[must_use]
    pub const fn task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Replaces or clears the estimate.
    #[must_use]
    pub const fn estimate(mut self, estimate: Option<Estimate>) -> Self {
        self.estimate = Some(estimate);
        self
    }
}

/// Data-integrity finding attached to read responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityWarning {
    /// The task's stored references form no legal container.
    OrphanedPlacement {
        /// Affected task.
        task_id: TaskId,
        /// Stored references.
        refs: PlacementRefs,
    },
    /// Several tasks in one container share a position.
    DuplicatePosition {
        /// Affected container.
        container: Container,
        /// Shared position.
        position: Position,
        /// Tasks at that position.
        tasks: Vec<TaskId>,
    },
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrphanedPlacement { task_id, .. } => {
                write!(f, "task {task_id} has an orphaned placement")
            }
            Self::DuplicatePosition {
                container,
                position,
                tasks,
            } => write!(
                f,
                "{} tasks share position {position} in {container}",
                tasks.len()
            ),
        }
    }
}

/// Ordered contents of one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerListing {
    /// Listed container.
    pub container: Container,
    /// Placed tasks in display order.
    pub tasks: Vec<Task>,
    /// Integrity findings for rows touching the container.
    pub warnings: Vec<IntegrityWarning>,
}

impl ContainerListing {
    /// Returns the task identifiers in display order.
    #[must_use]
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(Task::id).collect()
    }
}

/// Result of cloning templates into a sprint column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneReport {
    /// Tasks created, in template order.
    pub placed: Vec<TaskId>,
    /// Templates left out because the column was full.
    pub skipped: Vec<TemplateId>,
}
