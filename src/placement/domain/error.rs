//! Error types for placement domain validation and parsing.

use super::{BoardId, ContainerKind, TaskId};
use thiserror::Error;
use uuid::Uuid;

/// Errors returned while validating placement requests and domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlacementDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the storage limit.
    #[error("task title exceeds {max} characters (got {actual})")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length of the rejected title.
        actual: usize,
    },

    /// A column name is empty after trimming.
    #[error("column name must not be empty")]
    EmptyColumnName,

    /// The container type string is not recognised.
    #[error("unknown container type: {0}")]
    UnknownContainerType(String),

    /// A non-backlog target was given without an identifier.
    #[error("container type '{0}' requires a container identifier")]
    MissingContainerId(ContainerKind),

    /// A backlog target was given with an identifier.
    #[error("backlog targets must not carry a container identifier (got {0})")]
    UnexpectedContainerId(Uuid),

    /// The referenced container does not exist.
    #[error("{kind} {id} not found")]
    ContainerNotFound {
        /// Kind of the missing container.
        kind: ContainerKind,
        /// Identifier that failed to resolve.
        id: Uuid,
    },

    /// The container belongs to a different board than the task.
    #[error("{kind} {id} does not belong to board {board_id}")]
    ContainerOutOfScope {
        /// Kind of the foreign container.
        kind: ContainerKind,
        /// Identifier of the foreign container.
        id: Uuid,
        /// Board the operation is scoped to.
        board_id: BoardId,
    },

    /// The ordering anchor is not placed in the target container.
    #[error("anchor task {0} is not placed in the target container")]
    AnchorNotInContainer(TaskId),

    /// The ordering anchor is the task being moved.
    #[error("task {0} cannot be positioned after itself")]
    AnchorIsMovingTask(TaskId),

    /// Renumbering would overflow the position space.
    #[error("position space exhausted while renumbering a container")]
    PositionSpaceExhausted,

    /// A task cannot block itself.
    #[error("task {0} cannot block itself")]
    SelfBlocking(TaskId),

    /// Blocking edges must stay within one board.
    #[error("task {blocker} and task {blocked} belong to different boards")]
    BlockingAcrossBoards {
        /// Blocking task.
        blocker: TaskId,
        /// Blocked task.
        blocked: TaskId,
    },

    /// The blocking edge would close a dependency cycle.
    #[error("task {blocker} blocking task {blocked} would create a dependency cycle")]
    BlockingCycle {
        /// Blocking task.
        blocker: TaskId,
        /// Blocked task.
        blocked: TaskId,
    },
}

/// Error returned while parsing column roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown column role: {0}")]
pub struct ParseColumnRoleError(pub String);

/// Error returned while parsing task types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task type: {0}")]
pub struct ParseTaskTypeError(pub String);

/// Error returned while parsing task priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);
