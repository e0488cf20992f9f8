//! `PostgreSQL` adapters for placement persistence.
//!
//! Table layout lives in `migrations/`. The three placement references on
//! `tasks` carry no `CHECK` constraint: illegal combinations are read back
//! as orphaned placements and surfaced by the integrity audit.

mod models;
mod schema;
mod store;

pub use store::{PlacementPgPool, PostgresPlacementStore};
