//! Task placement and movement engine.
//!
//! Decides which single container a task occupies (a board's backlog, a
//! Kanban column, a sprint or a sprint's own column), keeps tasks ordered
//! inside that container, gates moves on WIP limits and blocking
//! dependencies, and reconciles optimistic client moves with the committed
//! server state. The module follows hexagonal architecture:
//!
//! - Domain types and pure rules in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Client-side reconciliation in [`sync`]
//! - Tunables in [`config`]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;
pub mod sync;

#[cfg(test)]
mod tests;
