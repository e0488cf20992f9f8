//! Unit tests for the placement module.
//!
//! Pure rules are tested directly; service behaviour runs against the
//! in-memory store through the shared [`support::Harness`].
