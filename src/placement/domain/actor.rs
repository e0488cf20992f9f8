//! Acting user and the permission grants resolved for them.
//!
//! Authentication happens elsewhere; the engine trusts the grants it is
//! handed and only checks them against the board being touched.

use super::{Board, BoardId, OrganizationId, UserId};
use serde::{Deserialize, Serialize};

/// A resolved permission grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "id", rename_all = "snake_case")]
pub enum Grant {
    /// Manage tasks on one board.
    Board(BoardId),
    /// Manage tasks on every board of an organization.
    Organization(OrganizationId),
}

/// The user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    user_id: UserId,
    grants: Vec<Grant>,
}

impl Actor {
    /// Creates an actor with the given grants.
    #[must_use]
    pub fn new(user_id: UserId, grants: impl IntoIterator<Item = Grant>) -> Self {
        Self {
            user_id,
            grants: grants.into_iter().collect(),
        }
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the resolved grants.
    #[must_use]
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    /// Returns whether the actor may manage tasks on `board`.
    #[must_use]
    pub fn can_manage(&self, board: &Board) -> bool {
        self.grants.iter().any(|grant| match *grant {
            Grant::Board(id) => id == board.id(),
            Grant::Organization(id) => id == board.organization_id(),
        })
    }
}
