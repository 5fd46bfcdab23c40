//! Taskbox Core Library
//!
//! Domain types, error type, and the repository port for the Taskbox
//! todo service. No I/O lives here; storage adapters and the HTTP
//! surface are in taskbox-server.

pub mod error;
pub mod ports;
pub mod types;

pub use error::{Result, TaskboxError};
pub use ports::TodoStore;
pub use types::{NewTodo, Todo, TodoPatch};
