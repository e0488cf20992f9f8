//! Shared setup for in-memory placement integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use sprintboard::placement::{
    adapters::memory::{InMemoryPlacementStore, RecordingEventSink},
    domain::{
        Actor, Board, BoardColumn, ColumnRole, Container, Grant, OrganizationId, Sprint,
        SprintColumn, TaskDetails, TaskId, TaskTitle, TemplateTask, UserId, WipLimit,
    },
    ports::{PlacementStore, PlacementStoreError},
    services::{CreateTaskRequest, MoveTaskRequest, PlacementService},
};

/// Service type used by the integration tests.
pub type TestService =
    PlacementService<InMemoryPlacementStore, RecordingEventSink, DefaultClock>;

/// A seeded board plus the service operating on it.
pub struct Workspace {
    pub store: Arc<InMemoryPlacementStore>,
    pub events: Arc<RecordingEventSink>,
    pub service: TestService,
    pub board: Board,
    pub actor: Actor,
}

impl Workspace {
    /// Seeds an empty board owned by a fresh organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the board cannot be stored.
    pub async fn seeded() -> Result<Self, eyre::Report> {
        let store = Arc::new(InMemoryPlacementStore::new());
        let events = Arc::new(RecordingEventSink::new());
        let service = PlacementService::new(
            Arc::clone(&store),
            Arc::clone(&events),
            Arc::new(DefaultClock),
        );
        let board = Board::new(OrganizationId::new(), "Delivery");
        let seeded = board.clone();
        store
            .transaction(move |tx| tx.insert_board(&seeded))
            .await?;
        let actor = Actor::new(UserId::new(), [Grant::Board(board.id())]);
        Ok(Self {
            store,
            events,
            service,
            board,
            actor,
        })
    }

    /// Adds a board column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is invalid or cannot be stored.
    pub async fn column(
        &self,
        name: &str,
        role: ColumnRole,
        limit: Option<u32>,
    ) -> Result<Container, eyre::Report> {
        let base = BoardColumn::new(self.board.id(), name, role)?;
        let column = match limit {
            Some(value) => base.with_wip_limit(WipLimit::new(value)),
            None => base,
        };
        let container = Container::BoardColumn(column.id());
        self.store
            .transaction(move |tx| tx.insert_board_column(&column))
            .await?;
        Ok(container)
    }

    /// Adds a sprint with one column and returns both containers.
    ///
    /// # Errors
    ///
    /// Returns an error if either record cannot be stored.
    pub async fn sprint_with_column(
        &self,
        sprint_name: &str,
        column_name: &str,
        role: ColumnRole,
        limit: Option<u32>,
    ) -> Result<(Container, Container), eyre::Report> {
        let sprint = Sprint::new(self.board.id(), sprint_name);
        let base = SprintColumn::new(sprint.id(), column_name, role)?;
        let column = match limit {
            Some(value) => base.with_wip_limit(WipLimit::new(value)),
            None => base,
        };
        let containers = (
            Container::Sprint(sprint.id()),
            Container::SprintColumn(column.id(), sprint.id()),
        );
        self.store
            .transaction(move |tx| -> Result<(), PlacementStoreError> {
                tx.insert_sprint(&sprint)?;
                tx.insert_sprint_column(&column)
            })
            .await?;
        Ok(containers)
    }

    /// Adds a template task.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is invalid or the template cannot be
    /// stored.
    pub async fn template(&self, title: &str, order: u32) -> Result<TemplateTask, eyre::Report> {
        let details = TaskDetails::new(TaskTitle::new(title)?);
        let template = TemplateTask::new(self.board.id(), details, order);
        let seeded = template.clone();
        self.store
            .transaction(move |tx| tx.insert_template(&seeded))
            .await?;
        Ok(template)
    }

    /// Creates a backlog task.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails.
    pub async fn task(&self, title: &str) -> Result<TaskId, eyre::Report> {
        let task = self
            .service
            .create_task(&self.actor, CreateTaskRequest::new(self.board.id(), title))
            .await?;
        Ok(task.id())
    }

    /// Builds a move request for the workspace actor.
    #[must_use]
    pub fn request(&self, task_id: TaskId, container: Container) -> MoveTaskRequest {
        MoveTaskRequest::new(self.actor.clone(), task_id, container)
    }

    /// Returns the display order of a container.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails.
    pub async fn order_of(&self, container: Container) -> Result<Vec<TaskId>, eyre::Report> {
        let listing = self
            .service
            .list_container(&self.actor, self.board.id(), container)
            .await?;
        Ok(listing.task_ids())
    }
}
