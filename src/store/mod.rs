//! Persistence layer: one snapshot slot, in memory or in a libSQL file.

pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use memory::MemoryStore;
pub use traits::SnapshotStore;
