//! Adapter implementations of the placement ports.

pub mod memory;
pub mod postgres;
