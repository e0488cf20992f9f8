//! Boards, sprints and the columns tasks are placed into.

use super::{
    BoardColumnId, BoardId, OrganizationId, ParseColumnRoleError, PlacementDomainError,
    SprintColumnId, SprintId, WipLimit,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow role of a column, set when the column is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Work has not started (for example "To do").
    Initial,
    /// Work is underway (for example "In progress" or "Review").
    Active,
    /// Work is finished (for example "Done").
    Terminal,
}

const TERMINAL_KEYWORDS: [&str; 5] = ["done", "complete", "closed", "finished", "shipped"];
const ACTIVE_KEYWORDS: [&str; 6] = ["progress", "doing", "review", "testing", "active", "wip"];

impl ColumnRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Active => "active",
            Self::Terminal => "terminal",
        }
    }

    /// Returns whether the role marks done-like columns.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// Infers a role from a legacy column name.
    ///
    /// Only for migrating columns configured before roles existed; move
    /// validation always reads the stored role.
    #[must_use]
    pub fn infer_from_name(name: &str) -> Self {
        let lowered = name.to_lowercase();
        if TERMINAL_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
            Self::Terminal
        } else if ACTIVE_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
            Self::Active
        } else {
            Self::Initial
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ColumnRole {
    type Error = ParseColumnRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "initial" => Ok(Self::Initial),
            "active" => Ok(Self::Active),
            "terminal" => Ok(Self::Terminal),
            _ => Err(ParseColumnRoleError(value.to_owned())),
        }
    }
}

/// Movement policy shared by board columns and sprint columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPolicy {
    /// Workflow role.
    pub role: ColumnRole,
    /// Optional work-in-progress limit.
    pub wip_limit: Option<WipLimit>,
}

fn validated_name(name: &str) -> Result<String, PlacementDomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PlacementDomainError::EmptyColumnName);
    }
    Ok(trimmed.to_owned())
}

/// A board: the project scope every task, sprint and column belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    id: BoardId,
    organization_id: OrganizationId,
    name: String,
}

impl Board {
    /// Creates a board owned by an organization.
    #[must_use]
    pub fn new(organization_id: OrganizationId, name: impl Into<String>) -> Self {
        Self::from_parts(BoardId::new(), organization_id, name)
    }

    /// Reconstructs a board from persisted parts.
    #[must_use]
    pub fn from_parts(
        id: BoardId,
        organization_id: OrganizationId,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            organization_id,
            name: name.into(),
        }
    }

    /// Returns the board identifier.
    #[must_use]
    pub const fn id(&self) -> BoardId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub const fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the board name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A Kanban column scoped to a board, outside of any sprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardColumn {
    id: BoardColumnId,
    board_id: BoardId,
    name: String,
    policy: ColumnPolicy,
}

impl BoardColumn {
    /// Creates a column with an explicit role and no WIP limit.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementDomainError::EmptyColumnName`] when the name is
    /// blank.
    pub fn new(
        board_id: BoardId,
        name: &str,
        role: ColumnRole,
    ) -> Result<Self, PlacementDomainError> {
        Ok(Self {
            id: BoardColumnId::new(),
            board_id,
            name: validated_name(name)?,
            policy: ColumnPolicy {
                role,
                wip_limit: None,
            },
        })
    }

    /// Creates a column whose role is inferred from a legacy name.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementDomainError::EmptyColumnName`] when the name is
    /// blank.
    pub fn from_legacy_name(board_id: BoardId, name: &str) -> Result<Self, PlacementDomainError> {
        Self::new(board_id, name, ColumnRole::infer_from_name(name))
    }

    /// Reconstructs a column from persisted parts.
    #[must_use]
    pub const fn from_parts(
        id: BoardColumnId,
        board_id: BoardId,
        name: String,
        policy: ColumnPolicy,
    ) -> Self {
        Self {
            id,
            board_id,
            name,
            policy,
        }
    }

    /// Sets the WIP limit.
    #[must_use]
    pub const fn with_wip_limit(mut self, limit: WipLimit) -> Self {
        self.policy.wip_limit = Some(limit);
        self
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn id(&self) -> BoardColumnId {
        self.id
    }

    /// Returns the owning board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the movement policy.
    #[must_use]
    pub const fn policy(&self) -> ColumnPolicy {
        self.policy
    }
}

/// A time-boxed sprint on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    id: SprintId,
    board_id: BoardId,
    name: String,
}

impl Sprint {
    /// Creates a sprint on a board.
    #[must_use]
    pub fn new(board_id: BoardId, name: impl Into<String>) -> Self {
        Self::from_parts(SprintId::new(), board_id, name)
    }

    /// Reconstructs a sprint from persisted parts.
    #[must_use]
    pub fn from_parts(id: SprintId, board_id: BoardId, name: impl Into<String>) -> Self {
        Self {
            id,
            board_id,
            name: name.into(),
        }
    }

    /// Returns the sprint identifier.
    #[must_use]
    pub const fn id(&self) -> SprintId {
        self.id
    }

    /// Returns the owning board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the sprint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A column inside a sprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintColumn {
    id: SprintColumnId,
    sprint_id: SprintId,
    name: String,
    policy: ColumnPolicy,
}

impl SprintColumn {
    /// Creates a sprint column with an explicit role and no WIP limit.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementDomainError::EmptyColumnName`] when the name is
    /// blank.
    pub fn new(
        sprint_id: SprintId,
        name: &str,
        role: ColumnRole,
    ) -> Result<Self, PlacementDomainError> {
        Ok(Self {
            id: SprintColumnId::new(),
            sprint_id,
            name: validated_name(name)?,
            policy: ColumnPolicy {
                role,
                wip_limit: None,
            },
        })
    }

    /// Reconstructs a sprint column from persisted parts.
    #[must_use]
    pub const fn from_parts(
        id: SprintColumnId,
        sprint_id: SprintId,
        name: String,
        policy: ColumnPolicy,
    ) -> Self {
        Self {
            id,
            sprint_id,
            name,
            policy,
        }
    }

    /// Sets the WIP limit.
    #[must_use]
    pub const fn with_wip_limit(mut self, limit: WipLimit) -> Self {
        self.policy.wip_limit = Some(limit);
        self
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn id(&self) -> SprintColumnId {
        self.id
    }

    /// Returns the owning sprint.
    #[must_use]
    pub const fn sprint_id(&self) -> SprintId {
        self.sprint_id
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the movement policy.
    #[must_use]
    pub const fn policy(&self) -> ColumnPolicy {
        self.policy
    }
}
