//! Application services for task placement.

mod access;
mod cloning;
mod error;
mod movement;
mod requests;

pub use error::{PlacementError, PlacementResult};
pub use movement::PlacementService;
pub use requests::{
    CloneReport, ContainerListing, CreateTaskRequest, IntegrityWarning, MoveOutcome,
    MoveTaskRequest, TaskDetailsUpdate,
};
