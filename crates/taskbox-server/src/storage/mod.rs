//! Storage adapters for the `TodoStore` port
//!
//! SQLite (embedded) for production, DashMap for tests and dev runs.

pub mod db;
pub mod memory;

pub use db::Database;
pub use memory::MemoryStore;
