//! Event sink that records published events in memory.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::placement::{
    domain::TaskMoved,
    ports::{EventSinkError, EventSinkResult, PlacementEventSink},
};

/// Thread-safe recording event sink.
#[derive(Debug, Clone, Default)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<TaskMoved>>>,
}

impl RecordingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every event published so far.
    ///
    /// # Errors
    ///
    /// Returns [`EventSinkError::Delivery`] if the sink lock is poisoned.
    pub fn events(&self) -> EventSinkResult<Vec<TaskMoved>> {
        let events = self
            .events
            .lock()
            .map_err(|err| EventSinkError::delivery(std::io::Error::other(err.to_string())))?;
        Ok(events.clone())
    }
}

#[async_trait]
impl PlacementEventSink for RecordingEventSink {
    async fn publish(&self, event: &TaskMoved) -> EventSinkResult<()> {
        let mut events = self
            .events
            .lock()
            .map_err(|err| EventSinkError::delivery(std::io::Error::other(err.to_string())))?;
        events.push(event.clone());
        Ok(())
    }
}
