//! Lookups and checks shared by placement operations.
//!
//! Everything here runs inside a store transaction and reads through the
//! [`PlacementTransaction`] it is handed.

use super::{IntegrityWarning, PlacementError, PlacementResult};
use crate::placement::{
    domain::{
        Actor, Board, BoardColumnId, BoardId, ColumnPolicy, ColumnRole, Container, ContainerKind,
        ContainerTarget, Placement, PlacementDomainError, Position, RankedTask, SprintColumnId,
        SprintId, Task, TaskId, WipLimit, sort_ranked,
    },
    ports::PlacementTransaction,
};
use std::collections::{HashMap, HashSet, VecDeque};

/// A move target checked against storage and the task's board.
#[derive(Debug, Clone, Copy)]
pub(super) struct ResolvedTarget {
    pub(super) container: Container,
    pub(super) policy: Option<ColumnPolicy>,
}

impl ResolvedTarget {
    pub(super) fn role(&self) -> Option<ColumnRole> {
        self.policy.map(|policy| policy.role)
    }

    pub(super) fn wip_limit(&self) -> Option<WipLimit> {
        self.policy.and_then(|policy| policy.wip_limit)
    }
}

pub(super) fn load_task(
    tx: &mut dyn PlacementTransaction,
    task_id: TaskId,
) -> PlacementResult<Task> {
    tx.find_task(task_id)?
        .ok_or(PlacementError::TaskNotFound(task_id))
}

/// Loads a board and checks that `actor` may manage it.
pub(super) fn authorized_board(
    tx: &mut dyn PlacementTransaction,
    actor: &Actor,
    board_id: BoardId,
) -> PlacementResult<Board> {
    let board = tx
        .find_board(board_id)?
        .ok_or(PlacementError::BoardNotFound(board_id))?;
    if actor.can_manage(&board) {
        Ok(board)
    } else {
        Err(PlacementError::Permission {
            user_id: actor.user_id(),
            board_id,
        })
    }
}

/// Resolves a target to a container on `board_id`.
///
/// The sprint owning a sprint column always comes from storage.
pub(super) fn resolve_target(
    tx: &mut dyn PlacementTransaction,
    board_id: BoardId,
    target: ContainerTarget,
) -> PlacementResult<ResolvedTarget> {
    let kind = target.kind();
    let Some(raw_id) = target.id() else {
        return match kind {
            ContainerKind::Backlog => Ok(ResolvedTarget {
                container: Container::Backlog,
                policy: None,
            }),
            _ => Err(PlacementDomainError::MissingContainerId(kind).into()),
        };
    };
    let not_found = || PlacementDomainError::ContainerNotFound { kind, id: raw_id };
    let out_of_scope = || PlacementDomainError::ContainerOutOfScope {
        kind,
        id: raw_id,
        board_id,
    };

    match kind {
        ContainerKind::Backlog => Err(PlacementDomainError::UnexpectedContainerId(raw_id).into()),
        ContainerKind::BoardColumn => {
            let column = tx
                .find_board_column(BoardColumnId::from_uuid(raw_id))?
                .ok_or_else(not_found)?;
            if column.board_id() != board_id {
                return Err(out_of_scope().into());
            }
            Ok(ResolvedTarget {
                container: Container::BoardColumn(column.id()),
                policy: Some(column.policy()),
            })
        }
        ContainerKind::Sprint => {
            let sprint = tx
                .find_sprint(SprintId::from_uuid(raw_id))?
                .ok_or_else(not_found)?;
            if sprint.board_id() != board_id {
                return Err(out_of_scope().into());
            }
            Ok(ResolvedTarget {
                container: Container::Sprint(sprint.id()),
                policy: None,
            })
        }
        ContainerKind::SprintColumn => {
            let column = tx
                .find_sprint_column(SprintColumnId::from_uuid(raw_id))?
                .ok_or_else(not_found)?;
            let sprint = tx
                .find_sprint(column.sprint_id())?
                .ok_or_else(not_found)?;
            if sprint.board_id() != board_id {
                return Err(out_of_scope().into());
            }
            Ok(ResolvedTarget {
                container: Container::SprintColumn(column.id(), sprint.id()),
                policy: Some(column.policy()),
            })
        }
    }
}

/// Returns the ranks of tasks placed in `container`, in display order.
///
/// Orphaned rows sharing a reference with the container are not placed
/// there and are left out.
pub(super) fn ranked_in(
    tx: &mut dyn PlacementTransaction,
    board_id: BoardId,
    container: Container,
) -> PlacementResult<Vec<RankedTask>> {
    let mut ranked: Vec<RankedTask> = tx
        .container_tasks(board_id, container)?
        .iter()
        .filter(|task| task.placement().is_in(container))
        .map(Task::ranked)
        .collect();
    sort_ranked(&mut ranked);
    Ok(ranked)
}

/// Mirrors renumbered positions into an in-progress ranking.
pub(super) fn apply_renumbering(ranked: &mut [RankedTask], renumbered: &[(TaskId, Position)]) {
    for (id, position) in renumbered {
        if let Some(entry) = ranked.iter_mut().find(|entry| entry.id == *id) {
            entry.position = *position;
        }
    }
}

/// Returns the blockers of `task_id` that are not in a terminal column.
pub(super) fn active_blockers(
    tx: &mut dyn PlacementTransaction,
    task_id: TaskId,
) -> PlacementResult<Vec<TaskId>> {
    let mut active = Vec::new();
    for blocker_id in tx.blockers_of(task_id)? {
        let Some(blocker) = tx.find_task(blocker_id)? else {
            continue;
        };
        if !is_finished(tx, &blocker)? {
            active.push(blocker_id);
        }
    }
    Ok(active)
}

fn is_finished(tx: &mut dyn PlacementTransaction, task: &Task) -> PlacementResult<bool> {
    let role = match task.container() {
        Some(Container::BoardColumn(id)) => tx
            .find_board_column(id)?
            .map(|column| column.policy().role),
        Some(Container::SprintColumn(id, _)) => tx
            .find_sprint_column(id)?
            .map(|column| column.policy().role),
        Some(Container::Backlog | Container::Sprint(_)) | None => None,
    };
    Ok(role.is_some_and(ColumnRole::is_terminal))
}

/// Returns whether `task` is already blocked, directly or transitively, by
/// `candidate`.
pub(super) fn is_blocked_by(
    tx: &mut dyn PlacementTransaction,
    task: TaskId,
    candidate: TaskId,
) -> PlacementResult<bool> {
    let mut pending = VecDeque::from([task]);
    let mut seen = HashSet::from([task]);
    while let Some(current) = pending.pop_front() {
        for upstream in tx.blockers_of(current)? {
            if upstream == candidate {
                return Ok(true);
            }
            if seen.insert(upstream) {
                pending.push_back(upstream);
            }
        }
    }
    Ok(false)
}

/// Collects orphaned placements and shared positions among `tasks`.
pub(super) fn integrity_warnings(tasks: &[Task]) -> Vec<IntegrityWarning> {
    let mut warnings: Vec<IntegrityWarning> = tasks
        .iter()
        .filter_map(|task| match *task.placement() {
            Placement::Orphaned { refs } => Some(IntegrityWarning::OrphanedPlacement {
                task_id: task.id(),
                refs,
            }),
            Placement::Placed { .. } => None,
        })
        .collect();

    let mut slots: HashMap<(Container, Position), Vec<TaskId>> = HashMap::new();
    for task in tasks {
        if let Some(container) = task.container() {
            slots
                .entry((container, task.position()))
                .or_default()
                .push(task.id());
        }
    }
    let mut shared: Vec<(Container, Position, Vec<TaskId>)> = slots
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|((container, position), mut ids)| {
            ids.sort();
            (container, position, ids)
        })
        .collect();
    shared.sort_by(|left, right| left.1.cmp(&right.1).then_with(|| left.2.cmp(&right.2)));
    warnings.extend(
        shared
            .into_iter()
            .map(|(container, position, ids)| IntegrityWarning::DuplicatePosition {
                container,
                position,
                tasks: ids,
            }),
    );
    warnings
}
