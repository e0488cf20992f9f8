//! In-memory adapters for placement tests.

mod event_sink;
mod store;

pub use event_sink::RecordingEventSink;
pub use store::InMemoryPlacementStore;
