//! Client-side optimistic synchronization of drag-and-drop moves.

mod client;
mod reconciler;

pub use client::{DragOutcome, PlacementGateway, SyncClient, SyncError};
pub use reconciler::{MoveTicket, ReconcileError, ReconcileOutcome, SyncReconciler};
