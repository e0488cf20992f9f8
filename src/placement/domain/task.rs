//! Task aggregate root and its descriptive fields.

use super::{
    BoardId, Classification, Container, ParsePriorityError, ParseTaskTypeError, Placement,
    PlacementDomainError, Position, RankedTask, TaskId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of work a task represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// User-facing feature work.
    #[default]
    Story,
    /// Defect fix.
    Bug,
    /// Maintenance work.
    Chore,
    /// Time-boxed investigation.
    Spike,
}

impl TaskType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Bug => "bug",
            Self::Chore => "chore",
            Self::Spike => "spike",
        }
    }
}

impl TryFrom<&str> for TaskType {
    type Error = ParseTaskTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "story" => Ok(Self::Story),
            "bug" => Ok(Self::Bug),
            "chore" => Ok(Self::Chore),
            "spike" => Ok(Self::Spike),
            _ => Err(ParseTaskTypeError(value.to_owned())),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal priority.
    #[default]
    Medium,
    /// Should be picked up soon.
    High,
    /// Drop everything.
    Critical,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

/// Estimate in story points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Estimate(u32);

impl Estimate {
    /// Creates an estimate.
    #[must_use]
    pub const fn new(points: u32) -> Self {
        Self(points)
    }

    /// Returns the story points.
    #[must_use]
    pub const fn points(self) -> u32 {
        self.0
    }
}

/// Validated, trimmed task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Longest title accepted by storage.
    pub const MAX_LENGTH: usize = 255;

    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementDomainError::EmptyTitle`] for blank titles and
    /// [`PlacementDomainError::TitleTooLong`] above [`Self::MAX_LENGTH`]
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, PlacementDomainError> {
        let raw: String = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PlacementDomainError::EmptyTitle);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(PlacementDomainError::TitleTooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptive task fields that never affect placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetails {
    /// Task title.
    pub title: TaskTitle,
    /// Kind of work.
    pub task_type: TaskType,
    /// Priority.
    pub priority: Priority,
    /// Optional story-point estimate.
    pub estimate: Option<Estimate>,
}

impl TaskDetails {
    /// Creates details with default type and priority and no estimate.
    #[must_use]
    pub fn new(title: TaskTitle) -> Self {
        Self {
            title,
            task_type: TaskType::default(),
            priority: Priority::default(),
            estimate: None,
        }
    }
}

/// Task aggregate root.
///
/// Placement changes go through [`Task::place`] (movement) or
/// [`Task::reset_to_backlog`] (orphan repair). Detail edits never touch
/// placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    board_id: BoardId,
    details: TaskDetails,
    placement: Placement,
    position: Position,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning board.
    pub board_id: BoardId,
    /// Persisted descriptive fields.
    pub details: TaskDetails,
    /// Placement translated from the stored reference triple.
    pub placement: Placement,
    /// Persisted position.
    pub position: Position,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task in the backlog at the given position.
    #[must_use]
    pub fn new(
        board_id: BoardId,
        details: TaskDetails,
        position: Position,
        clock: &impl Clock,
    ) -> Self {
        Self::new_in(board_id, details, Container::Backlog, position, clock)
    }

    /// Creates a task directly inside a container (template cloning).
    #[must_use]
    pub fn new_in(
        board_id: BoardId,
        details: TaskDetails,
        container: Container,
        position: Position,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            board_id,
            details,
            placement: Placement::from(container),
            position,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            board_id: data.board_id,
            details: data.details,
            placement: data.placement,
            position: data.position,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the descriptive fields.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.details.title
    }

    /// Returns the placement.
    #[must_use]
    pub const fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Returns the container, or `None` when the stored placement is orphaned.
    #[must_use]
    pub const fn container(&self) -> Option<Container> {
        self.placement.container()
    }

    /// Returns the diagnostic classification.
    #[must_use]
    pub const fn classification(&self) -> Classification {
        self.placement.classification()
    }

    /// Returns the position inside the current container.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the ordering projection.
    #[must_use]
    pub const fn ranked(&self) -> RankedTask {
        RankedTask {
            id: self.id,
            position: self.position,
            created_at: self.created_at,
        }
    }

    /// Places the task in `container` at `position`, clearing every
    /// reference the container does not use.
    pub fn place(&mut self, container: Container, position: Position, clock: &impl Clock) {
        self.placement = Placement::from(container);
        self.position = position;
        self.touch(clock);
    }

    /// Clears all placement references, returning the task to the backlog.
    pub fn reset_to_backlog(&mut self, position: Position, clock: &impl Clock) {
        self.place(Container::Backlog, position, clock);
    }

    /// Updates the rank without changing container (container renumbering).
    pub const fn reposition(&mut self, position: Position) {
        self.position = position;
    }

    /// Replaces the descriptive fields.
    pub fn update_details(&mut self, details: TaskDetails, clock: &impl Clock) {
        self.details = details;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
