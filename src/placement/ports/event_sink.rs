//! Notification port for committed placement changes.

use crate::placement::domain::TaskMoved;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for event sink operations.
pub type EventSinkResult<T> = Result<T, EventSinkError>;

/// Receives events after the store has committed them.
///
/// Delivery is best effort from the engine's point of view: a failed
/// publish is logged and never undoes the move.
#[async_trait]
pub trait PlacementEventSink: Send + Sync {
    /// Publishes a task-moved event.
    async fn publish(&self, event: &TaskMoved) -> EventSinkResult<()>;
}

/// Errors returned by event sink adapters.
#[derive(Debug, Clone, Error)]
pub enum EventSinkError {
    /// The event could not be delivered.
    #[error("event delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl EventSinkError {
    /// Wraps a delivery error.
    #[must_use]
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
