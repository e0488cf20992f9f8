//! Position ordering engine.
//!
//! Positions are sparse integers. Inserting between two neighbours takes the
//! midpoint, so the common case touches only the moving task. A container
//! is renumbered (`gap, 2 * gap, ...`) only when no integer remains between
//! the neighbours or when duplicate positions are found. Removing a task
//! never renumbers anything.

use super::{PlacementDomainError, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Default spacing between renumbered positions.
pub const DEFAULT_POSITION_GAP: u64 = 1024;

/// Smallest spacing that still leaves room for a midpoint.
const MIN_POSITION_GAP: u64 = 2;

/// Rank of a task inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(u64);

impl Position {
    /// Creates a position.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric rank.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordering-relevant projection of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedTask {
    /// Task identifier.
    pub id: TaskId,
    /// Current position.
    pub position: Position,
    /// Creation timestamp, used to break position ties.
    pub created_at: DateTime<Utc>,
}

/// Compares two tasks by position, then creation time (oldest first), then
/// identifier, so no two distinct tasks ever compare equal.
#[must_use]
pub fn compare_ranked(left: &RankedTask, right: &RankedTask) -> Ordering {
    left.position
        .cmp(&right.position)
        .then_with(|| left.created_at.cmp(&right.created_at))
        .then_with(|| left.id.cmp(&right.id))
}

/// Sorts tasks into display order.
pub fn sort_ranked(tasks: &mut [RankedTask]) {
    tasks.sort_by(compare_ranked);
}

/// Where a task lands inside its target container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "at", content = "task_id", rename_all = "snake_case")]
pub enum InsertAnchor {
    /// Before every other task.
    Start,
    /// Immediately after the given task.
    After(TaskId),
    /// After every other task.
    #[default]
    End,
}

/// Result of planning an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertPlan {
    /// Position assigned to the inserted task.
    pub position: Position,
    /// Other tasks whose positions change; empty in the common case.
    pub renumbered: Vec<(TaskId, Position)>,
    /// Task immediately before the inserted one, if any.
    pub preceding: Option<TaskId>,
}

/// Plans the insertion of `moving` into a container.
///
/// `ranked` lists the tasks currently placed in the container; `moving` is
/// ignored if present, so reordering within one container works the same
/// way as moving in from elsewhere.
///
/// # Errors
///
/// Returns [`PlacementDomainError::AnchorIsMovingTask`] or
/// [`PlacementDomainError::AnchorNotInContainer`] for bad anchors, and
/// [`PlacementDomainError::PositionSpaceExhausted`] if renumbering would
/// overflow.
pub fn plan_insert(
    ranked: &[RankedTask],
    moving: TaskId,
    anchor: InsertAnchor,
    gap: u64,
) -> Result<InsertPlan, PlacementDomainError> {
    let step = gap.max(MIN_POSITION_GAP);
    let mut others: Vec<RankedTask> = ranked
        .iter()
        .filter(|task| task.id != moving)
        .copied()
        .collect();
    sort_ranked(&mut others);

    let slot = match anchor {
        InsertAnchor::Start => 0,
        InsertAnchor::End => others.len(),
        InsertAnchor::After(anchor_id) if anchor_id == moving => {
            return Err(PlacementDomainError::AnchorIsMovingTask(anchor_id));
        }
        InsertAnchor::After(anchor_id) => others
            .iter()
            .position(|task| task.id == anchor_id)
            .map(|index| index + 1)
            .ok_or(PlacementDomainError::AnchorNotInContainer(anchor_id))?,
    };
    let preceding = preceding_at(&others, slot).map(|task| task.id);

    if !has_duplicate_positions(&others) {
        if let Some(position) = gap_position(&others, slot, step) {
            return Ok(InsertPlan {
                position,
                renumbered: Vec::new(),
                preceding,
            });
        }
    }

    let (position, renumbered) = renumber_around(&others, moving, slot, step)?;
    Ok(InsertPlan {
        position,
        renumbered,
        preceding,
    })
}

/// Renumbers a container to evenly spaced positions in display order.
///
/// # Errors
///
/// Returns [`PlacementDomainError::PositionSpaceExhausted`] if the container
/// is too large for the requested gap.
pub fn reorder(
    ranked: &[RankedTask],
    gap: u64,
) -> Result<Vec<(TaskId, Position)>, PlacementDomainError> {
    let step = gap.max(MIN_POSITION_GAP);
    let mut ordered = ranked.to_vec();
    sort_ranked(&mut ordered);
    ordered
        .iter()
        .enumerate()
        .map(|(index, task)| Ok((task.id, rank_for(index, step)?)))
        .collect()
}

fn preceding_at(others: &[RankedTask], slot: usize) -> Option<&RankedTask> {
    slot.checked_sub(1).and_then(|index| others.get(index))
}

fn has_duplicate_positions(sorted: &[RankedTask]) -> bool {
    sorted
        .windows(2)
        .any(|pair| matches!(pair, [first, second] if first.position == second.position))
}

fn gap_position(others: &[RankedTask], slot: usize, step: u64) -> Option<Position> {
    let lower = preceding_at(others, slot).map_or(0, |task| task.position.value());
    match others.get(slot) {
        Some(next) => {
            let upper = next.position.value();
            let midpoint = lower.midpoint(upper);
            (midpoint > lower && midpoint < upper).then_some(Position(midpoint))
        }
        None => lower.checked_add(step).map(Position),
    }
}

fn rank_for(index: usize, step: u64) -> Result<Position, PlacementDomainError> {
    u64::try_from(index)
        .ok()
        .and_then(|value| value.checked_add(1))
        .and_then(|value| value.checked_mul(step))
        .map(Position)
        .ok_or(PlacementDomainError::PositionSpaceExhausted)
}

fn renumber_around(
    others: &[RankedTask],
    moving: TaskId,
    slot: usize,
    step: u64,
) -> Result<(Position, Vec<(TaskId, Position)>), PlacementDomainError> {
    let mut sequence: Vec<(TaskId, Option<Position>)> = others
        .iter()
        .map(|task| (task.id, Some(task.position)))
        .collect();
    sequence.insert(slot, (moving, None));

    let mut moving_position = None;
    let mut renumbered = Vec::new();
    for (index, (id, previous)) in sequence.into_iter().enumerate() {
        let assigned = rank_for(index, step)?;
        match previous {
            None => moving_position = Some(assigned),
            Some(old) if old != assigned => renumbered.push((id, assigned)),
            Some(_) => {}
        }
    }

    let position = moving_position.ok_or(PlacementDomainError::PositionSpaceExhausted)?;
    Ok((position, renumbered))
}
