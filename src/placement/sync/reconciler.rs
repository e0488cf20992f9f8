//! Optimistic drag-and-drop reconciliation.
//!
//! The reconciler keeps the last server-confirmed ordering of each container
//! plus one pending-move record per task in flight. The displayed view is
//! always derived: confirmed state with pending moves applied on top. A
//! server answer either folds into the confirmed state or discards the
//! pending record, so a failed move can never leave a stale guess behind.

use crate::placement::{
    domain::{Container, InsertAnchor, TaskId},
    services::{ContainerListing, MoveOutcome},
};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Handle for one optimistic move, returned by
/// [`SyncReconciler::begin_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveTicket {
    task_id: TaskId,
    sequence: u64,
}

impl MoveTicket {
    /// Returns the task being moved.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }
}

/// How the server's answer compared with the optimistic guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The task landed where it was shown; nothing visibly moves.
    Reaffirmed,
    /// The server placed the task elsewhere; the view jumps to match.
    Corrected,
}

/// Errors returned by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The task already has a move awaiting the server.
    #[error("task {0} already has a move in flight")]
    MoveInFlight(TaskId),

    /// The ticket does not match the pending move of its task.
    #[error("no pending move matches the ticket for task {0}")]
    UnknownTicket(TaskId),
}

#[derive(Debug, Clone, Copy)]
struct PendingMove {
    sequence: u64,
    target: Container,
    anchor: InsertAnchor,
}

/// Client-side view state for one board.
#[derive(Debug, Clone, Default)]
pub struct SyncReconciler {
    confirmed: HashMap<Container, Vec<TaskId>>,
    pending: HashMap<TaskId, PendingMove>,
    errors: HashMap<TaskId, String>,
    stale: HashSet<TaskId>,
    next_sequence: u64,
}

impl SyncReconciler {
    /// Creates an empty reconciler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the confirmed ordering of one container.
    ///
    /// Listed tasks are removed from every other container, since a task
    /// is only ever placed once.
    pub fn replace_container(&mut self, container: Container, tasks: Vec<TaskId>) {
        let listed: HashSet<TaskId> = tasks.iter().copied().collect();
        for (other, ids) in &mut self.confirmed {
            if *other != container {
                ids.retain(|id| !listed.contains(id));
            }
        }
        for id in &listed {
            self.stale.remove(id);
        }
        self.confirmed.insert(container, tasks);
    }

    /// Replaces the confirmed ordering from a server listing.
    pub fn refresh(&mut self, listing: &ContainerListing) {
        self.replace_container(listing.container, listing.task_ids());
    }

    /// Shows a move immediately and records it as pending.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::MoveInFlight`] when the task already has a
    /// pending move. Other tasks are unaffected.
    pub fn begin_move(
        &mut self,
        task_id: TaskId,
        target: Container,
        anchor: InsertAnchor,
    ) -> Result<MoveTicket, ReconcileError> {
        if self.pending.contains_key(&task_id) {
            return Err(ReconcileError::MoveInFlight(task_id));
        }
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.pending.insert(
            task_id,
            PendingMove {
                sequence,
                target,
                anchor,
            },
        );
        self.errors.remove(&task_id);
        Ok(MoveTicket { task_id, sequence })
    }

    /// Folds the server's committed outcome into the confirmed state.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UnknownTicket`] when the ticket is not the
    /// task's pending move.
    pub fn confirm(
        &mut self,
        ticket: MoveTicket,
        outcome: &MoveOutcome,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let pending = self.pending_for(ticket)?;
        let view = self.displayed();
        let predicted_preceding = preceding_in(&view, pending.target, ticket.task_id);
        self.pending.remove(&ticket.task_id);

        let container = outcome.task.container().unwrap_or(pending.target);
        self.remove_confirmed(ticket.task_id);
        let ids = self.confirmed.entry(container).or_default();
        let index = outcome
            .preceding
            .and_then(|preceding| ids.iter().position(|id| *id == preceding))
            .map_or_else(
                || if outcome.preceding.is_some() { ids.len() } else { 0 },
                |found| found + 1,
            );
        ids.insert(index, ticket.task_id);

        self.errors.remove(&ticket.task_id);
        self.stale.remove(&ticket.task_id);
        if container == pending.target && predicted_preceding == outcome.preceding {
            Ok(ReconcileOutcome::Reaffirmed)
        } else {
            Ok(ReconcileOutcome::Corrected)
        }
    }

    /// Discards a pending move, restoring the last confirmed state, and
    /// records `reason` for display.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UnknownTicket`] when the ticket is not the
    /// task's pending move.
    pub fn rollback(
        &mut self,
        ticket: MoveTicket,
        reason: impl Into<String>,
    ) -> Result<(), ReconcileError> {
        self.pending_for(ticket)?;
        self.pending.remove(&ticket.task_id);
        self.errors.insert(ticket.task_id, reason.into());
        Ok(())
    }

    /// Flags a task whose server state is unknown until the next refresh.
    pub fn mark_stale(&mut self, task_id: TaskId) {
        self.stale.insert(task_id);
    }

    /// Returns whether the task's container must be refreshed.
    #[must_use]
    pub fn needs_refresh(&self, task_id: TaskId) -> bool {
        self.stale.contains(&task_id)
    }

    /// Returns whether the task has a move awaiting the server.
    #[must_use]
    pub fn in_flight(&self, task_id: TaskId) -> bool {
        self.pending.contains_key(&task_id)
    }

    /// Returns the last failure recorded for the task.
    #[must_use]
    pub fn last_error(&self, task_id: TaskId) -> Option<&str> {
        self.errors.get(&task_id).map(String::as_str)
    }

    /// Returns the confirmed ordering of a container.
    #[must_use]
    pub fn confirmed_view(&self, container: Container) -> Vec<TaskId> {
        self.confirmed.get(&container).cloned().unwrap_or_default()
    }

    /// Returns the displayed ordering of a container.
    #[must_use]
    pub fn container_view(&self, container: Container) -> Vec<TaskId> {
        self.displayed().remove(&container).unwrap_or_default()
    }

    /// Returns every container as currently displayed.
    #[must_use]
    pub fn displayed(&self) -> HashMap<Container, Vec<TaskId>> {
        let mut view = self.confirmed.clone();
        let mut moves: Vec<(TaskId, PendingMove)> = self
            .pending
            .iter()
            .map(|(task_id, pending)| (*task_id, *pending))
            .collect();
        moves.sort_by_key(|(_, pending)| pending.sequence);

        for (task_id, pending) in moves {
            for ids in view.values_mut() {
                ids.retain(|id| *id != task_id);
            }
            let ids = view.entry(pending.target).or_default();
            let index = match pending.anchor {
                InsertAnchor::Start => 0,
                InsertAnchor::End => ids.len(),
                InsertAnchor::After(anchor) => ids
                    .iter()
                    .position(|id| *id == anchor)
                    .map_or(ids.len(), |found| found + 1),
            };
            ids.insert(index, task_id);
        }
        view
    }

    fn pending_for(&self, ticket: MoveTicket) -> Result<PendingMove, ReconcileError> {
        self.pending
            .get(&ticket.task_id)
            .filter(|pending| pending.sequence == ticket.sequence)
            .copied()
            .ok_or(ReconcileError::UnknownTicket(ticket.task_id))
    }

    fn remove_confirmed(&mut self, task_id: TaskId) {
        for ids in self.confirmed.values_mut() {
            ids.retain(|id| *id != task_id);
        }
    }
}

fn preceding_in(
    view: &HashMap<Container, Vec<TaskId>>,
    container: Container,
    task_id: TaskId,
) -> Option<TaskId> {
    let ids = view.get(&container)?;
    let index = ids.iter().position(|id| *id == task_id)?;
    index.checked_sub(1).and_then(|previous| ids.get(previous)).copied()
}
