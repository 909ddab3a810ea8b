//! Workspace-level integration test package for bigmath.
//!
//! The tests live in `tests/` and exercise the facade, the core engine and
//! the persistence crate together.
