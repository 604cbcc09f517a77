//! # warden-database
//!
//! Entity store implementations for the Warden authorization graph.
//!
//! - [`memory::MemoryEntityStore`]: a complete in-process store with
//!   uniqueness and cascade semantics, used by tests and single-process
//!   deployments.
//! - [`repositories`]: PostgreSQL adapters. Schema creation is owned by
//!   the host application; these only read and write rows.
//! - [`snapshot::GraphSnapshot`]: an immutable, materialized slice of the
//!   graph loaded from PostgreSQL in one transaction.

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod snapshot;

pub use connection::DatabasePool;
pub use memory::{MemoryEntityStore, SubjectHandle};
pub use snapshot::GraphSnapshot;
