//! Domain model for task placement.
//!
//! Pure types and rules: containers and their classification, position
//! ordering, the blocking gate and WIP limits. Nothing here performs I/O;
//! services run these rules inside store transactions.

mod actor;
mod board;
mod container;
mod error;
mod event;
mod gate;
mod ids;
mod ordering;
mod task;
mod template;
mod wip;

pub use actor::{Actor, Grant};
pub use board::{Board, BoardColumn, ColumnPolicy, ColumnRole, Sprint, SprintColumn};
pub use container::{
    Classification, Container, ContainerKind, ContainerTarget, Placement, PlacementRefs, classify,
};
pub use error::{ParseColumnRoleError, ParsePriorityError, ParseTaskTypeError, PlacementDomainError};
pub use event::TaskMoved;
pub use gate::{BlockingWarning, GateDecision, evaluate_blocking};
pub use ids::{
    BoardColumnId, BoardId, OrganizationId, SprintColumnId, SprintId, TaskId, TemplateId, UserId,
};
pub use ordering::{
    DEFAULT_POSITION_GAP, InsertAnchor, InsertPlan, Position, RankedTask, compare_ranked,
    plan_insert, reorder, sort_ranked,
};
pub use task::{
    Estimate, PersistedTaskData, Priority, Task, TaskDetails, TaskTitle, TaskType,
};
pub use template::TemplateTask;
pub use wip::{WipDecision, WipLimit, available_slots, evaluate_wip};
