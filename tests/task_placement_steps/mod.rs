//! Step definitions for task placement behaviour tests.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
