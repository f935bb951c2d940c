//! Storage implementations.
//!
//! - [`memory`] - in-memory store for tests and development
//! - [`postgres`] - PostgreSQL store (feature = "postgres")

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryIntakeStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresIntakeStore;
