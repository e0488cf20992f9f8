//! Drives optimistic moves end to end against a placement gateway.

use super::reconciler::{MoveTicket, ReconcileError, ReconcileOutcome, SyncReconciler};
use crate::placement::{
    config::SyncConfig,
    domain::{Actor, BoardId, Container, InsertAnchor, TaskId},
    ports::{PlacementEventSink, PlacementStore},
    services::{ContainerListing, MoveOutcome, MoveTaskRequest, PlacementError, PlacementService},
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const ABANDONED: &str = "drag abandoned before the server answered";

/// Server operations the sync client depends on.
#[async_trait]
pub trait PlacementGateway: Send + Sync {
    /// Submits a move.
    async fn move_task(&self, request: MoveTaskRequest) -> Result<MoveOutcome, PlacementError>;

    /// Fetches the canonical ordering of a container.
    async fn list_container(
        &self,
        actor: &Actor,
        board_id: BoardId,
        container: Container,
    ) -> Result<ContainerListing, PlacementError>;
}

#[async_trait]
impl<S, E, C> PlacementGateway for PlacementService<S, E, C>
where
    S: PlacementStore + 'static,
    E: PlacementEventSink + 'static,
    C: Clock + Send + Sync + 'static,
{
    async fn move_task(&self, request: MoveTaskRequest) -> Result<MoveOutcome, PlacementError> {
        Self::move_task(self, request).await
    }

    async fn list_container(
        &self,
        actor: &Actor,
        board_id: BoardId,
        container: Container,
    ) -> Result<ContainerListing, PlacementError> {
        Self::list_container(self, actor, board_id, container).await
    }
}

/// Errors returned by [`SyncClient`].
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// The local view refused the move.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// The server rejected the request.
    #[error(transparent)]
    Rejected(#[from] PlacementError),

    /// The server did not answer in time; it may still commit.
    #[error("server did not answer within {0:?}")]
    TimedOut(Duration),
}

/// A move the server committed, and how it compared with the local guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragOutcome {
    /// Committed server outcome.
    pub outcome: MoveOutcome,
    /// Whether the displayed position had to jump.
    pub reconciliation: ReconcileOutcome,
}

/// Client for one actor's view of one board.
pub struct SyncClient<G>
where
    G: PlacementGateway,
{
    gateway: Arc<G>,
    state: Arc<Mutex<SyncReconciler>>,
    actor: Actor,
    board_id: BoardId,
    config: SyncConfig,
}

impl<G> Clone for SyncClient<G>
where
    G: PlacementGateway,
{
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            state: Arc::clone(&self.state),
            actor: self.actor.clone(),
            board_id: self.board_id,
            config: self.config,
        }
    }
}

impl<G> SyncClient<G>
where
    G: PlacementGateway,
{
    /// Creates a client with an empty view.
    #[must_use]
    pub fn new(gateway: Arc<G>, actor: Actor, board_id: BoardId, config: SyncConfig) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(SyncReconciler::new())),
            actor,
            board_id,
            config,
        }
    }

    /// Moves a task optimistically and waits for the server.
    ///
    /// The move is displayed before the request is sent. A committed
    /// outcome replaces the guess; a rejection or a timeout rolls it back.
    /// After a timeout the task is flagged for refresh because the server
    /// may still commit the move. Dropping the returned future before it
    /// completes rolls the guess back the same way.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Reconcile`] when the task already has a move in
    /// flight, [`SyncError::Rejected`] when the server refuses the move and
    /// [`SyncError::TimedOut`] when it does not answer in time.
    pub async fn drag(
        &self,
        task_id: TaskId,
        target: Container,
        anchor: InsertAnchor,
        force: bool,
    ) -> Result<DragOutcome, SyncError> {
        let ticket = lock(&self.state).begin_move(task_id, target, anchor)?;
        let pending = PendingDrag::new(&self.state, ticket);
        let request = build_request(self.actor.clone(), task_id, target, anchor, force);
        let timeout = self.config.request_timeout();
        let response = tokio::time::timeout(timeout, self.gateway.move_task(request)).await;

        let resolved = pending.resolve();
        let mut state = lock(&self.state);
        match response {
            Ok(Ok(outcome)) => {
                let reconciliation = state.confirm(resolved, &outcome)?;
                debug!(task_id = %task_id, ?reconciliation, "move confirmed");
                Ok(DragOutcome {
                    outcome,
                    reconciliation,
                })
            }
            Ok(Err(err)) => {
                state.rollback(resolved, err.to_string())?;
                debug!(task_id = %task_id, error = %err, "move rolled back");
                Err(SyncError::Rejected(err))
            }
            Err(_) => {
                let err = SyncError::TimedOut(timeout);
                state.rollback(resolved, err.to_string())?;
                state.mark_stale(task_id);
                warn!(task_id = %task_id, "move timed out; view needs refresh");
                Err(err)
            }
        }
    }

    /// Replaces the confirmed ordering of a container from the server.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Rejected`] when the listing fails and
    /// [`SyncError::TimedOut`] when the server does not answer in time.
    pub async fn refresh(&self, container: Container) -> Result<(), SyncError> {
        let timeout = self.config.request_timeout();
        let listing = tokio::time::timeout(
            timeout,
            self.gateway
                .list_container(&self.actor, self.board_id, container),
        )
        .await
        .map_err(|_| SyncError::TimedOut(timeout))??;
        lock(&self.state).refresh(&listing);
        Ok(())
    }

    /// Returns the displayed ordering of a container.
    #[must_use]
    pub fn view(&self, container: Container) -> Vec<TaskId> {
        lock(&self.state).container_view(container)
    }

    /// Returns whether the task has a move awaiting the server.
    #[must_use]
    pub fn in_flight(&self, task_id: TaskId) -> bool {
        lock(&self.state).in_flight(task_id)
    }

    /// Returns whether the task must be refreshed after a timeout.
    #[must_use]
    pub fn needs_refresh(&self, task_id: TaskId) -> bool {
        lock(&self.state).needs_refresh(task_id)
    }

    /// Returns the last failure shown for the task.
    #[must_use]
    pub fn last_error(&self, task_id: TaskId) -> Option<String> {
        lock(&self.state).last_error(task_id).map(str::to_owned)
    }
}

/// Rolls back a drag whose future is dropped before the server answers.
struct PendingDrag<'a> {
    state: &'a Mutex<SyncReconciler>,
    ticket: MoveTicket,
    armed: bool,
}

impl<'a> PendingDrag<'a> {
    const fn new(state: &'a Mutex<SyncReconciler>, ticket: MoveTicket) -> Self {
        Self {
            state,
            ticket,
            armed: true,
        }
    }

    fn resolve(mut self) -> MoveTicket {
        self.armed = false;
        self.ticket
    }
}

impl Drop for PendingDrag<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let ticket = self.ticket;
        let mut state = lock(self.state);
        if state.rollback(ticket, ABANDONED).is_ok() {
            state.mark_stale(ticket.task_id());
            warn!(task_id = %ticket.task_id(), "drag abandoned; view needs refresh");
        }
    }
}

// No lock is held across an await, so a poisoned guard still holds a
// consistent reconciler.
fn lock(state: &Mutex<SyncReconciler>) -> MutexGuard<'_, SyncReconciler> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn build_request(
    actor: Actor,
    task_id: TaskId,
    target: Container,
    anchor: InsertAnchor,
    force: bool,
) -> MoveTaskRequest {
    let request = MoveTaskRequest::new(actor, task_id, target);
    let anchored = match anchor {
        InsertAnchor::Start => request.at_start(),
        InsertAnchor::After(preceding) => request.after(preceding),
        InsertAnchor::End => request,
    };
    if force { anchored.forced() } else { anchored }
}
