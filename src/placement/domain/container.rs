//! Container model: the four placement containers and their classification.
//!
//! Storage keeps a task's placement as three nullable references
//! (`board_column_id`, `sprint_id`, `sprint_column_id`). Everything above
//! the persistence edge works with the tagged [`Container`] variant instead;
//! [`Placement::from_refs`] is the single translation point between the two.

use super::{BoardColumnId, PlacementDomainError, SprintColumnId, SprintId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of a placement container, without identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// The board's product backlog.
    Backlog,
    /// A Kanban column outside any sprint.
    BoardColumn,
    /// A sprint's untriaged backlog.
    Sprint,
    /// A column inside a sprint.
    SprintColumn,
}

impl ContainerKind {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::BoardColumn => "board_column",
            Self::Sprint => "sprint",
            Self::SprintColumn => "sprint_column",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ContainerKind {
    type Error = PlacementDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "backlog" => Ok(Self::Backlog),
            "board_column" => Ok(Self::BoardColumn),
            "sprint" => Ok(Self::Sprint),
            "sprint_column" => Ok(Self::SprintColumn),
            _ => Err(PlacementDomainError::UnknownContainerType(value.to_owned())),
        }
    }
}

/// A legal placement container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "container_type", content = "container_id", rename_all = "snake_case")]
pub enum Container {
    /// The board's product backlog.
    Backlog,
    /// A Kanban column outside any sprint.
    BoardColumn(BoardColumnId),
    /// A sprint, before the task is triaged into one of its columns.
    Sprint(SprintId),
    /// A column inside a sprint, carrying the owning sprint.
    SprintColumn(SprintColumnId, SprintId),
}

impl Container {
    /// Returns the container kind.
    #[must_use]
    pub const fn kind(self) -> ContainerKind {
        match self {
            Self::Backlog => ContainerKind::Backlog,
            Self::BoardColumn(_) => ContainerKind::BoardColumn,
            Self::Sprint(_) => ContainerKind::Sprint,
            Self::SprintColumn(..) => ContainerKind::SprintColumn,
        }
    }

    /// Returns the classification this container produces.
    #[must_use]
    pub const fn classification(self) -> Classification {
        match self {
            Self::Backlog => Classification::Backlog,
            Self::BoardColumn(_) => Classification::BoardColumn,
            Self::Sprint(_) => Classification::Sprint,
            Self::SprintColumn(..) => Classification::SprintColumn,
        }
    }

    /// Returns the identifier addressed by API targets, if any.
    ///
    /// Sprint columns are addressed by the column identifier alone.
    #[must_use]
    pub const fn target_id(self) -> Option<Uuid> {
        match self {
            Self::Backlog => None,
            Self::BoardColumn(id) => Some(id.into_inner()),
            Self::Sprint(id) => Some(id.into_inner()),
            Self::SprintColumn(id, _) => Some(id.into_inner()),
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target_id() {
            Some(id) => write!(f, "{} {id}", self.kind()),
            None => write!(f, "{}", self.kind()),
        }
    }
}

/// Diagnostic classification of a task's stored placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// No placement references set.
    Backlog,
    /// Placed in a board column.
    BoardColumn,
    /// Placed in a sprint without a column.
    Sprint,
    /// Placed in a sprint column.
    SprintColumn,
    /// The stored references violate the containment invariant.
    Orphaned,
}

impl Classification {
    /// Returns the canonical reporting representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::BoardColumn => "board_column",
            Self::Sprint => "sprint",
            Self::SprintColumn => "sprint_column",
            Self::Orphaned => "orphaned",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical placement layout: three nullable references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementRefs {
    /// Board column reference.
    pub board_column: Option<BoardColumnId>,
    /// Sprint reference.
    pub sprint: Option<SprintId>,
    /// Sprint column reference.
    pub sprint_column: Option<SprintColumnId>,
}

impl PlacementRefs {
    /// Classifies the reference triple.
    #[must_use]
    pub const fn classify(&self) -> Classification {
        match (self.board_column, self.sprint, self.sprint_column) {
            (None, None, None) => Classification::Backlog,
            (Some(_), None, None) => Classification::BoardColumn,
            (None, Some(_), None) => Classification::Sprint,
            (None, Some(_), Some(_)) => Classification::SprintColumn,
            _ => Classification::Orphaned,
        }
    }

    /// Converts a legal triple into its container, or `None` when orphaned.
    #[must_use]
    pub const fn to_container(&self) -> Option<Container> {
        match (self.board_column, self.sprint, self.sprint_column) {
            (None, None, None) => Some(Container::Backlog),
            (Some(column), None, None) => Some(Container::BoardColumn(column)),
            (None, Some(sprint), None) => Some(Container::Sprint(sprint)),
            (None, Some(sprint), Some(column)) => Some(Container::SprintColumn(column, sprint)),
            _ => None,
        }
    }

    /// Returns whether a storage query for `container` would match this row.
    ///
    /// Matching follows the physical key of each container kind, so orphaned
    /// rows carrying a sprint column reference are matched by that column.
    #[must_use]
    pub fn touches(&self, container: Container) -> bool {
        match container {
            Container::Backlog => *self == Self::default(),
            Container::BoardColumn(column) => self.board_column == Some(column),
            Container::Sprint(sprint) => {
                self.sprint == Some(sprint) && self.sprint_column.is_none()
            }
            Container::SprintColumn(column, _) => self.sprint_column == Some(column),
        }
    }
}

impl From<Container> for PlacementRefs {
    fn from(container: Container) -> Self {
        match container {
            Container::Backlog => Self::default(),
            Container::BoardColumn(column) => Self {
                board_column: Some(column),
                ..Self::default()
            },
            Container::Sprint(sprint) => Self {
                sprint: Some(sprint),
                ..Self::default()
            },
            Container::SprintColumn(column, sprint) => Self {
                board_column: None,
                sprint: Some(sprint),
                sprint_column: Some(column),
            },
        }
    }
}

/// Classifies a stored reference triple.
#[must_use]
pub const fn classify(refs: &PlacementRefs) -> Classification {
    refs.classify()
}

/// Placement of a task as seen above the persistence edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Placement {
    /// The task sits in a legal container.
    Placed {
        /// Container holding the task.
        container: Container,
    },
    /// The stored references are corrupt; kept verbatim for diagnostics.
    Orphaned {
        /// Raw stored references.
        refs: PlacementRefs,
    },
}

impl Placement {
    /// Placement in the product backlog.
    pub const BACKLOG: Self = Self::Placed {
        container: Container::Backlog,
    };

    /// Translates a stored reference triple.
    #[must_use]
    pub const fn from_refs(refs: PlacementRefs) -> Self {
        match refs.to_container() {
            Some(container) => Self::Placed { container },
            None => Self::Orphaned { refs },
        }
    }

    /// Returns the reference triple to persist.
    #[must_use]
    pub fn refs(&self) -> PlacementRefs {
        match *self {
            Self::Placed { container } => PlacementRefs::from(container),
            Self::Orphaned { refs } => refs,
        }
    }

    /// Returns the container, or `None` when orphaned.
    #[must_use]
    pub const fn container(&self) -> Option<Container> {
        match *self {
            Self::Placed { container } => Some(container),
            Self::Orphaned { .. } => None,
        }
    }

    /// Returns the diagnostic classification.
    #[must_use]
    pub const fn classification(&self) -> Classification {
        match *self {
            Self::Placed { container } => container.classification(),
            Self::Orphaned { .. } => Classification::Orphaned,
        }
    }

    /// Returns whether the task is placed in exactly `container`.
    #[must_use]
    pub fn is_in(&self, container: Container) -> bool {
        self.container() == Some(container)
    }
}

impl From<Container> for Placement {
    fn from(container: Container) -> Self {
        Self::Placed { container }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placed { container } => write!(f, "{container}"),
            Self::Orphaned { .. } => f.write_str("orphaned"),
        }
    }
}

/// API-level move target: a container type plus an optional identifier.
///
/// Targets are parsed before any store access. The sprint owning a sprint
/// column is resolved from storage rather than trusted from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerTarget {
    kind: ContainerKind,
    id: Option<Uuid>,
}

impl ContainerTarget {
    /// Parses a target from its wire representation.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementDomainError::UnknownContainerType`] for unknown
    /// type strings, [`PlacementDomainError::MissingContainerId`] when a
    /// non-backlog target lacks an identifier, and
    /// [`PlacementDomainError::UnexpectedContainerId`] when a backlog target
    /// carries one.
    pub fn parse(
        container_type: &str,
        container_id: Option<Uuid>,
    ) -> Result<Self, PlacementDomainError> {
        let kind = ContainerKind::try_from(container_type)?;
        match (kind, container_id) {
            (ContainerKind::Backlog, Some(id)) => {
                Err(PlacementDomainError::UnexpectedContainerId(id))
            }
            (ContainerKind::Backlog, None) => Ok(Self { kind, id: None }),
            (_, None) => Err(PlacementDomainError::MissingContainerId(kind)),
            (_, Some(id)) => Ok(Self { kind, id: Some(id) }),
        }
    }

    /// Returns the target kind.
    #[must_use]
    pub const fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Returns the target identifier (always `None` for the backlog).
    #[must_use]
    pub const fn id(&self) -> Option<Uuid> {
        self.id
    }
}

impl From<Container> for ContainerTarget {
    fn from(container: Container) -> Self {
        Self {
            kind: container.kind(),
            id: container.target_id(),
        }
    }
}
