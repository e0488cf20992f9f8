//! Port contracts for task placement.
//!
//! Ports define infrastructure-agnostic interfaces used by placement
//! services.

pub mod event_sink;
pub mod store;

pub use event_sink::{EventSinkError, EventSinkResult, PlacementEventSink};
pub use store::{PlacementStore, PlacementStoreError, PlacementStoreResult, PlacementTransaction};
