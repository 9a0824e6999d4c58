//! Shared test infrastructure.
//!
//! [`fixtures`] builds small type universes reused across the unit tests of every module.

pub(crate) mod fixtures;
