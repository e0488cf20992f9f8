//! In-memory placement store for tests and demos.
//!
//! Every transaction runs against a clone of the state while holding the
//! store mutex; the clone replaces the live state only when the work
//! succeeds. That gives the same all-or-nothing behaviour and the same
//! serialization of concurrent writers the `PostgreSQL` adapter gets from
//! row locks.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use crate::placement::{
    domain::{
        Board, BoardColumn, BoardColumnId, BoardId, Container, Position, Sprint, SprintColumn,
        SprintColumnId, SprintId, Task, TaskId, TemplateId, TemplateTask,
    },
    ports::{PlacementStore, PlacementStoreError, PlacementStoreResult, PlacementTransaction},
};

/// Thread-safe in-memory placement store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlacementStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    state: MemoryState,
    fail_next_commit: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    boards: HashMap<BoardId, Board>,
    board_columns: HashMap<BoardColumnId, BoardColumn>,
    sprints: HashMap<SprintId, Sprint>,
    sprint_columns: HashMap<SprintColumnId, SprintColumn>,
    templates: HashMap<TemplateId, TemplateTask>,
    tasks: HashMap<TaskId, Task>,
    // (blocker, blocked)
    blocking_edges: BTreeSet<(TaskId, TaskId)>,
}

impl InMemoryPlacementStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next transaction fail at commit time with `reason`.
    ///
    /// The work still runs, so this exercises the rollback path of whatever
    /// the work wrote.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementStoreError::Persistence`] if the store lock is
    /// poisoned.
    pub fn fail_next_commit(&self, reason: impl Into<String>) -> PlacementStoreResult<()> {
        let mut inner = self.inner.lock().map_err(|err| {
            PlacementStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        inner.fail_next_commit = Some(reason.into());
        Ok(())
    }

    fn run<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn PlacementTransaction) -> Result<T, E>,
        E: From<PlacementStoreError>,
    {
        let mut inner = self.inner.lock().map_err(|err| {
            PlacementStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut working = inner.state.clone();
        let outcome = work(&mut MemoryTransaction {
            state: &mut working,
        })?;
        if let Some(reason) = inner.fail_next_commit.take() {
            return Err(E::from(PlacementStoreError::persistence(
                std::io::Error::other(reason),
            )));
        }
        inner.state = working;
        Ok(outcome)
    }
}

#[async_trait]
impl PlacementStore for InMemoryPlacementStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn PlacementTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<PlacementStoreError> + Send + 'static,
    {
        self.run(work)
    }
}

struct MemoryTransaction<'a> {
    state: &'a mut MemoryState,
}

fn insert_unique<K, V>(
    map: &mut HashMap<K, V>,
    key: K,
    value: V,
    record: &'static str,
) -> PlacementStoreResult<()>
where
    K: std::hash::Hash + Eq + std::fmt::Display,
{
    if map.contains_key(&key) {
        return Err(PlacementStoreError::duplicate(record, key));
    }
    map.insert(key, value);
    Ok(())
}

impl PlacementTransaction for MemoryTransaction<'_> {
    fn find_task(&mut self, id: TaskId) -> PlacementStoreResult<Option<Task>> {
        Ok(self.state.tasks.get(&id).cloned())
    }

    fn insert_task(&mut self, task: &Task) -> PlacementStoreResult<()> {
        insert_unique(&mut self.state.tasks, task.id(), task.clone(), "task")
    }

    fn update_task(&mut self, task: &Task) -> PlacementStoreResult<()> {
        let stored = self
            .state
            .tasks
            .get_mut(&task.id())
            .ok_or_else(|| PlacementStoreError::not_found("task", task.id()))?;
        *stored = task.clone();
        Ok(())
    }

    fn delete_task(&mut self, id: TaskId) -> PlacementStoreResult<()> {
        self.state.tasks.remove(&id);
        self.state
            .blocking_edges
            .retain(|(blocker, blocked)| *blocker != id && *blocked != id);
        Ok(())
    }

    fn update_positions(&mut self, positions: &[(TaskId, Position)]) -> PlacementStoreResult<()> {
        for (id, position) in positions {
            let stored = self
                .state
                .tasks
                .get_mut(id)
                .ok_or_else(|| PlacementStoreError::not_found("task", id))?;
            stored.reposition(*position);
        }
        Ok(())
    }

    fn lock_container(
        &mut self,
        _board_id: BoardId,
        _container: Container,
    ) -> PlacementStoreResult<()> {
        // The store mutex is already held for the whole transaction.
        Ok(())
    }

    fn container_tasks(
        &mut self,
        board_id: BoardId,
        container: Container,
    ) -> PlacementStoreResult<Vec<Task>> {
        Ok(self
            .state
            .tasks
            .values()
            .filter(|task| {
                task.board_id() == board_id && task.placement().refs().touches(container)
            })
            .cloned()
            .collect())
    }

    fn board_tasks(&mut self, board_id: BoardId) -> PlacementStoreResult<Vec<Task>> {
        Ok(self
            .state
            .tasks
            .values()
            .filter(|task| task.board_id() == board_id)
            .cloned()
            .collect())
    }

    fn find_board(&mut self, id: BoardId) -> PlacementStoreResult<Option<Board>> {
        Ok(self.state.boards.get(&id).cloned())
    }

    fn insert_board(&mut self, board: &Board) -> PlacementStoreResult<()> {
        insert_unique(&mut self.state.boards, board.id(), board.clone(), "board")
    }

    fn find_board_column(
        &mut self,
        id: BoardColumnId,
    ) -> PlacementStoreResult<Option<BoardColumn>> {
        Ok(self.state.board_columns.get(&id).cloned())
    }

    fn insert_board_column(&mut self, column: &BoardColumn) -> PlacementStoreResult<()> {
        insert_unique(
            &mut self.state.board_columns,
            column.id(),
            column.clone(),
            "board column",
        )
    }

    fn find_sprint(&mut self, id: SprintId) -> PlacementStoreResult<Option<Sprint>> {
        Ok(self.state.sprints.get(&id).cloned())
    }

    fn insert_sprint(&mut self, sprint: &Sprint) -> PlacementStoreResult<()> {
        insert_unique(&mut self.state.sprints, sprint.id(), sprint.clone(), "sprint")
    }

    fn find_sprint_column(
        &mut self,
        id: SprintColumnId,
    ) -> PlacementStoreResult<Option<SprintColumn>> {
        Ok(self.state.sprint_columns.get(&id).cloned())
    }

    fn insert_sprint_column(&mut self, column: &SprintColumn) -> PlacementStoreResult<()> {
        insert_unique(
            &mut self.state.sprint_columns,
            column.id(),
            column.clone(),
            "sprint column",
        )
    }

    fn board_templates(&mut self, board_id: BoardId) -> PlacementStoreResult<Vec<TemplateTask>> {
        let mut templates: Vec<TemplateTask> = self
            .state
            .templates
            .values()
            .filter(|template| template.board_id() == board_id)
            .cloned()
            .collect();
        templates.sort_by_key(|template| (template.order(), template.id()));
        Ok(templates)
    }

    fn insert_template(&mut self, template: &TemplateTask) -> PlacementStoreResult<()> {
        insert_unique(
            &mut self.state.templates,
            template.id(),
            template.clone(),
            "template",
        )
    }

    fn blockers_of(&mut self, task_id: TaskId) -> PlacementStoreResult<Vec<TaskId>> {
        Ok(self
            .state
            .blocking_edges
            .iter()
            .filter(|(_, blocked)| *blocked == task_id)
            .map(|(blocker, _)| *blocker)
            .collect())
    }

    fn insert_blocking_edge(
        &mut self,
        blocker: TaskId,
        blocked: TaskId,
    ) -> PlacementStoreResult<()> {
        self.state.blocking_edges.insert((blocker, blocked));
        Ok(())
    }

    fn delete_blocking_edge(
        &mut self,
        blocker: TaskId,
        blocked: TaskId,
    ) -> PlacementStoreResult<()> {
        self.state.blocking_edges.remove(&(blocker, blocked));
        Ok(())
    }
}
