//! Shared world state for task placement BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use sprintboard::placement::{
    adapters::memory::{InMemoryPlacementStore, RecordingEventSink},
    domain::{Actor, Board, Container, Grant, OrganizationId, TaskId, UserId},
    services::{CloneReport, MoveOutcome, PlacementError, PlacementService},
};

/// Service type used by the BDD world.
pub type TestPlacementService =
    PlacementService<InMemoryPlacementStore, RecordingEventSink, DefaultClock>;

/// Scenario world for task placement behaviour tests.
pub struct PlacementWorld {
    pub store: Arc<InMemoryPlacementStore>,
    pub service: TestPlacementService,
    pub board: Board,
    pub actor: Actor,
    pub containers: HashMap<String, Container>,
    pub tasks: HashMap<String, TaskId>,
    pub last_move: Option<Result<MoveOutcome, PlacementError>>,
    pub last_clone: Option<CloneReport>,
}

impl PlacementWorld {
    /// Creates a world whose board is stored by the background step.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryPlacementStore::new());
        let service = PlacementService::new(
            Arc::clone(&store),
            Arc::new(RecordingEventSink::new()),
            Arc::new(DefaultClock),
        );
        let board = Board::new(OrganizationId::new(), "Scenario board");
        let actor = Actor::new(UserId::new(), [Grant::Board(board.id())]);

        Self {
            store,
            service,
            board,
            actor,
            containers: HashMap::new(),
            tasks: HashMap::new(),
            last_move: None,
            last_clone: None,
        }
    }

    /// Looks up a named container.
    ///
    /// # Errors
    ///
    /// Returns an error if no container has that name.
    pub fn container(&self, name: &str) -> Result<Container, eyre::Report> {
        self.containers
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown container {name} in scenario world"))
    }

    /// Looks up a named task.
    ///
    /// # Errors
    ///
    /// Returns an error if no task has that title.
    pub fn task(&self, title: &str) -> Result<TaskId, eyre::Report> {
        self.tasks
            .get(title)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown task {title} in scenario world"))
    }
}

impl Default for PlacementWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PlacementWorld {
    PlacementWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
