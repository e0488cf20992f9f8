//! Store port for transactional placement persistence.
//!
//! The store is the only synchronization point for placement. Services hand
//! it a unit of work; the adapter runs that work against a
//! [`PlacementTransaction`] and commits only if the work succeeds, so a
//! failure at any step leaves no partial writes behind.

use crate::placement::domain::{
    Board, BoardColumn, BoardColumnId, BoardId, Container, Position, Sprint, SprintColumn,
    SprintColumnId, SprintId, Task, TaskId, TemplateTask,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type PlacementStoreResult<T> = Result<T, PlacementStoreError>;

/// Synchronous view of the store inside one transaction.
pub trait PlacementTransaction {
    /// Finds a task by identifier.
    fn find_task(&mut self, id: TaskId) -> PlacementStoreResult<Option<Task>>;

    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementStoreError::Duplicate`] when the identifier exists.
    fn insert_task(&mut self, task: &Task) -> PlacementStoreResult<()>;

    /// Persists placement, position and detail changes of an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementStoreError::NotFound`] when the task does not exist.
    fn update_task(&mut self, task: &Task) -> PlacementStoreResult<()>;

    /// Deletes a task together with every blocking edge touching it.
    fn delete_task(&mut self, id: TaskId) -> PlacementStoreResult<()>;

    /// Rewrites positions of tasks renumbered by the ordering engine.
    fn update_positions(&mut self, positions: &[(TaskId, Position)]) -> PlacementStoreResult<()>;

    /// Serializes concurrent writers into `container` until commit.
    fn lock_container(
        &mut self,
        board_id: BoardId,
        container: Container,
    ) -> PlacementStoreResult<()>;

    /// Returns tasks of `board_id` whose stored references match the
    /// physical key of `container`, including orphaned rows.
    fn container_tasks(
        &mut self,
        board_id: BoardId,
        container: Container,
    ) -> PlacementStoreResult<Vec<Task>>;

    /// Returns every task on a board.
    fn board_tasks(&mut self, board_id: BoardId) -> PlacementStoreResult<Vec<Task>>;

    /// Finds a board.
    fn find_board(&mut self, id: BoardId) -> PlacementStoreResult<Option<Board>>;

    /// Stores a board.
    fn insert_board(&mut self, board: &Board) -> PlacementStoreResult<()>;

    /// Finds a board column.
    fn find_board_column(&mut self, id: BoardColumnId) -> PlacementStoreResult<Option<BoardColumn>>;

    /// Stores a board column.
    fn insert_board_column(&mut self, column: &BoardColumn) -> PlacementStoreResult<()>;

    /// Finds a sprint.
    fn find_sprint(&mut self, id: SprintId) -> PlacementStoreResult<Option<Sprint>>;

    /// Stores a sprint.
    fn insert_sprint(&mut self, sprint: &Sprint) -> PlacementStoreResult<()>;

    /// Finds a sprint column.
    fn find_sprint_column(
        &mut self,
        id: SprintColumnId,
    ) -> PlacementStoreResult<Option<SprintColumn>>;

    /// Stores a sprint column.
    fn insert_sprint_column(&mut self, column: &SprintColumn) -> PlacementStoreResult<()>;

    /// Returns a board's templates in template order.
    fn board_templates(&mut self, board_id: BoardId) -> PlacementStoreResult<Vec<TemplateTask>>;

    /// Stores a template.
    fn insert_template(&mut self, template: &TemplateTask) -> PlacementStoreResult<()>;

    /// Returns the tasks blocking `task_id`.
    fn blockers_of(&mut self, task_id: TaskId) -> PlacementStoreResult<Vec<TaskId>>;

    /// Records that `blocker` blocks `blocked`. Existing edges are kept.
    fn insert_blocking_edge(
        &mut self,
        blocker: TaskId,
        blocked: TaskId,
    ) -> PlacementStoreResult<()>;

    /// Removes the edge `blocker` blocks `blocked`, if present.
    fn delete_blocking_edge(
        &mut self,
        blocker: TaskId,
        blocked: TaskId,
    ) -> PlacementStoreResult<()>;
}

/// Transactional placement store.
#[async_trait]
pub trait PlacementStore: Send + Sync {
    /// Runs `work` in one transaction, committing only when it returns `Ok`.
    ///
    /// Implementations must give the work an isolation level under which two
    /// concurrent units that count and insert into the same container after
    /// [`PlacementTransaction::lock_container`] cannot both see a stale
    /// count.
    ///
    /// # Errors
    ///
    /// Returns the work's own error unchanged, or a store error converted
    /// into `E` when the transaction cannot begin or commit.
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn PlacementTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<PlacementStoreError> + Send + 'static;
}

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error)]
pub enum PlacementStoreError {
    /// A record with the same identifier already exists.
    #[error("duplicate {record}: {id}")]
    Duplicate {
        /// Record kind.
        record: &'static str,
        /// Conflicting identifier.
        id: String,
    },

    /// The record to update does not exist.
    #[error("{record} not found: {id}")]
    NotFound {
        /// Record kind.
        record: &'static str,
        /// Missing identifier.
        id: String,
    },

    /// A concurrent transaction won; the caller may retry.
    #[error("transaction conflict: {0}")]
    Conflict(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PlacementStoreError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Creates a duplicate-record error.
    #[must_use]
    pub fn duplicate(record: &'static str, id: impl ToString) -> Self {
        Self::Duplicate {
            record,
            id: id.to_string(),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(record: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            record,
            id: id.to_string(),
        }
    }
}
