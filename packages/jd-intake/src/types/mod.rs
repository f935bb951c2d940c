//! Domain types for the intake core.

pub mod events;
pub mod processing;
pub mod section;
pub mod snapshot;
pub mod summary;
