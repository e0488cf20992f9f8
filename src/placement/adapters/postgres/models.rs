//! Diesel row models for placement persistence.

use super::schema::{board_columns, boards, sprint_columns, sprints, tasks, template_tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row for the `boards` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = boards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BoardRow {
    /// Board identifier.
    pub id: uuid::Uuid,
    /// Owning organization.
    pub organization_id: uuid::Uuid,
    /// Board name.
    pub name: String,
}

/// Row for the `board_columns` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = board_columns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BoardColumnRow {
    /// Column identifier.
    pub id: uuid::Uuid,
    /// Owning board.
    pub board_id: uuid::Uuid,
    /// Column name.
    pub name: String,
    /// Workflow role.
    pub role: String,
    /// Optional WIP limit.
    pub wip_limit: Option<i32>,
}

/// Row for the `sprints` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = sprints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SprintRow {
    /// Sprint identifier.
    pub id: uuid::Uuid,
    /// Owning board.
    pub board_id: uuid::Uuid,
    /// Sprint name.
    pub name: String,
}

/// Row for the `sprint_columns` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = sprint_columns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SprintColumnRow {
    /// Column identifier.
    pub id: uuid::Uuid,
    /// Owning sprint.
    pub sprint_id: uuid::Uuid,
    /// Column name.
    pub name: String,
    /// Workflow role.
    pub role: String,
    /// Optional WIP limit.
    pub wip_limit: Option<i32>,
}

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning board.
    pub board_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task type.
    pub task_type: String,
    /// Task priority.
    pub priority: String,
    /// Optional estimate.
    pub estimate: Option<i32>,
    /// Board column reference.
    pub board_column_id: Option<uuid::Uuid>,
    /// Sprint reference.
    pub sprint_id: Option<uuid::Uuid>,
    /// Sprint column reference.
    pub sprint_column_id: Option<uuid::Uuid>,
    /// Rank inside the container.
    pub position: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for task records.
///
/// `None` placement references are written as `NULL` so that a move clears
/// every reference the target container does not use.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskRecord {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning board.
    pub board_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task type.
    pub task_type: String,
    /// Task priority.
    pub priority: String,
    /// Optional estimate.
    pub estimate: Option<i32>,
    /// Board column reference.
    pub board_column_id: Option<uuid::Uuid>,
    /// Sprint reference.
    pub sprint_id: Option<uuid::Uuid>,
    /// Sprint column reference.
    pub sprint_column_id: Option<uuid::Uuid>,
    /// Rank inside the container.
    pub position: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row for the `template_tasks` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = template_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TemplateTaskRow {
    /// Template identifier.
    pub id: uuid::Uuid,
    /// Owning board.
    pub board_id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Task type.
    pub task_type: String,
    /// Priority.
    pub priority: String,
    /// Optional estimate.
    pub estimate: Option<i32>,
    /// Clone order.
    pub template_order: i32,
}
