//! Persistence layer: the `Storage` trait plus its backends.

pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlStorage;
pub use memory::InMemoryStorage;
pub use traits::Storage;
