//! Shared helpers for `PostgreSQL` placement tests.

use std::sync::Arc;

use chrono::Utc;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use sprintboard::placement::{
    adapters::{
        memory::RecordingEventSink,
        postgres::{PlacementPgPool, PostgresPlacementStore},
    },
    domain::{
        Actor, Board, BoardColumn, ColumnRole, Container, Grant, OrganizationId,
        PersistedTaskData, Placement, PlacementRefs, Position, Sprint, SprintColumn, Task,
        TaskDetails, TaskId, TaskTitle, UserId, WipLimit,
    },
    ports::{PlacementStore, PlacementStoreError},
    services::{CreateTaskRequest, MoveTaskRequest, PlacementService},
};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// SQL creating the placement tables.
pub const CREATE_PLACEMENT_TABLES_SQL: &str =
    include_str!("../../migrations/2026-01-05-000000_create_placement_tables/up.sql");

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "sprintboard_test_template";

/// Service type used by the `PostgreSQL` tests.
pub type PgService = PlacementService<PostgresPlacementStore, RecordingEventSink, DefaultClock>;

/// Creates a runtime whose blocking pool can run transactions side by side.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn test_runtime() -> eyre::Result<Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?)
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if the template cannot be created or migrated.
pub fn ensure_template(cluster: &TestCluster) -> eyre::Result<()> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_PLACEMENT_TABLES_SQL)
                .map_err(|e| eyre::eyre!("migration failed: {e}"))?;
            Ok(())
        })
        .map_err(|e| eyre::eyre!("template setup failed: {e}"))?;
    Ok(())
}

/// Drops the test database when the workspace goes out of scope.
pub struct CleanupGuard {
    cluster: &'static TestCluster,
    db_name: String,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.db_name);
        }
    }
}

/// A seeded board in its own database plus the service operating on it.
///
/// Fields drop in order, so the pool closes before the database is dropped.
pub struct PgWorkspace {
    pub store: Arc<PostgresPlacementStore>,
    pub service: PgService,
    pub board: Board,
    pub actor: Actor,
    _cleanup: CleanupGuard,
}

impl PgWorkspace {
    /// Creates a database from the template and seeds an empty board.
    ///
    /// # Errors
    ///
    /// Returns an error if the database, pool or board cannot be created.
    pub fn open(cluster: &'static TestCluster, runtime: &Runtime) -> eyre::Result<Self> {
        ensure_template(cluster)?;
        let db_name = format!("placement_{}", Uuid::new_v4().simple());
        cluster
            .create_database_from_template(db_name.as_str(), TEMPLATE_DB)
            .map_err(|e| eyre::eyre!("database creation failed: {e}"))?;
        let cleanup = CleanupGuard {
            cluster,
            db_name: db_name.clone(),
        };

        let url = cluster.connection().database_url(&db_name);
        let manager = ConnectionManager::<PgConnection>::new(url);
        let pool: PlacementPgPool = Pool::builder().max_size(4).build(manager)?;
        let store = Arc::new(PostgresPlacementStore::new(pool));
        let service = PlacementService::new(
            Arc::clone(&store),
            Arc::new(RecordingEventSink::new()),
            Arc::new(DefaultClock),
        );
        let board = Board::new(OrganizationId::new(), "Storage");
        let seeded = board.clone();
        runtime.block_on(store.transaction(move |tx| tx.insert_board(&seeded)))?;
        let actor = Actor::new(UserId::new(), [Grant::Board(board.id())]);
        Ok(Self {
            store,
            service,
            board,
            actor,
            _cleanup: cleanup,
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
    ) -> eyre::Result<Container> {
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
    ) -> eyre::Result<(Container, Container)> {
        let sprint = Sprint::new(self.board.id(), sprint_name);
        let column = SprintColumn::new(sprint.id(), column_name, ColumnRole::Active)?;
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

    /// Creates a backlog task.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails.
    pub async fn task(&self, title: &str) -> eyre::Result<TaskId> {
        let task = self
            .service
            .create_task(&self.actor, CreateTaskRequest::new(self.board.id(), title))
            .await?;
        Ok(task.id())
    }

    /// Creates a task and moves it into `container`.
    ///
    /// # Errors
    ///
    /// Returns an error if creation or the move fails.
    pub async fn task_in(&self, title: &str, container: Container) -> eyre::Result<TaskId> {
        let task_id = self.task(title).await?;
        self.service.move_task(self.request(task_id, container)).await?;
        Ok(task_id)
    }

    /// Writes a task row with the given references, bypassing placement rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is invalid or the insert fails.
    pub async fn raw_task(&self, title: &str, refs: PlacementRefs) -> eyre::Result<TaskId> {
        let now = Utc::now();
        let task = Task::from_persisted(PersistedTaskData {
            id: TaskId::new(),
            board_id: self.board.id(),
            details: TaskDetails::new(TaskTitle::new(title)?),
            placement: Placement::from_refs(refs),
            position: Position::new(1024),
            created_at: now,
            updated_at: now,
        });
        let task_id = task.id();
        self.store
            .transaction(move |tx| tx.insert_task(&task))
            .await?;
        Ok(task_id)
    }

    /// Reads a task straight from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails or the task is missing.
    pub async fn stored(&self, task_id: TaskId) -> eyre::Result<Task> {
        self.store
            .transaction(move |tx| tx.find_task(task_id))
            .await?
            .ok_or_else(|| eyre::eyre!("task {task_id} should exist"))
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
    pub async fn order_of(&self, container: Container) -> eyre::Result<Vec<TaskId>> {
        let listing = self
            .service
            .list_container(&self.actor, self.board.id(), container)
            .await?;
        Ok(listing.task_ids())
    }
}
