//! Service-level errors for placement operations.

use crate::placement::{
    domain::{BoardId, Container, PlacementDomainError, TaskId, UserId, WipLimit},
    ports::PlacementStoreError,
};
use thiserror::Error;

/// Errors returned by [`super::PlacementService`].
///
/// Every variant leaves the store untouched: a failing operation never
/// commits part of its work.
#[derive(Debug, Clone, Error)]
pub enum PlacementError {
    /// The request was malformed or pointed outside the task's board.
    #[error(transparent)]
    Validation(#[from] PlacementDomainError),

    /// The actor holds no grant covering the board.
    #[error("user {user_id} may not manage tasks on board {board_id}")]
    Permission {
        /// Acting user.
        user_id: UserId,
        /// Board the operation touched.
        board_id: BoardId,
    },

    /// The task has unfinished blockers and the target column is terminal.
    #[error("task {task_id} is blocked by {blockers} unfinished task(s)")]
    Blocked {
        /// Task that was refused.
        task_id: TaskId,
        /// Number of active blockers.
        blockers: usize,
    },

    /// The target container is full.
    #[error("{container} is at its WIP limit ({current}/{limit})")]
    Capacity {
        /// Full container.
        container: Container,
        /// Tasks currently placed there.
        current: usize,
        /// Configured limit.
        limit: WipLimit,
    },

    /// The task does not exist.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    /// The board does not exist.
    #[error("board {0} not found")]
    BoardNotFound(BoardId),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] PlacementStoreError),
}

impl PlacementError {
    /// Returns whether the caller may retry the same request unchanged.
    ///
    /// Only transient store failures qualify. The service never retries on
    /// its own.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Store(PlacementStoreError::Conflict(_) | PlacementStoreError::Persistence(_))
        )
    }
}

/// Result type for placement service operations.
pub type PlacementResult<T> = Result<T, PlacementError>;
