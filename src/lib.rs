//! Sprintboard: task placement for boards and sprints.
//!
//! This crate provides the engine that places tasks into backlogs, board
//! columns, sprints and sprint columns, orders them, enforces WIP limits and
//! blocking dependencies on every move, and keeps an optimistic client view
//! in step with the server.
//!
//! # Architecture
//!
//! Sprintboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure placement rules with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and notifications
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`placement`]: Containers, ordering, movement policy and sync

pub mod placement;
