//! Identifier newtypes for the placement domain.
//!
//! Every record kind gets its own UUID wrapper so that a board column
//! identifier can never be passed where a sprint column is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier! {
    /// Unique identifier for a task.
    TaskId
}

uuid_identifier! {
    /// Unique identifier for a board (project scope).
    BoardId
}

uuid_identifier! {
    /// Unique identifier for a Kanban column outside any sprint.
    BoardColumnId
}

uuid_identifier! {
    /// Unique identifier for a sprint.
    SprintId
}

uuid_identifier! {
    /// Unique identifier for a column inside a sprint.
    SprintColumnId
}

uuid_identifier! {
    /// Unique identifier for a predefined template task.
    TemplateId
}

uuid_identifier! {
    /// Identifier of the acting user, supplied by the identity provider.
    UserId
}

uuid_identifier! {
    /// Identifier of an organization owning boards.
    OrganizationId
}
