//! Repository trait for todo persistence

use crate::types::{NewTodo, Todo, TodoPatch};
use crate::Result;
use async_trait::async_trait;

/// Todo store
///
/// Absence on `get` is `Ok(None)`; absence on `update`/`delete` is a
/// signaled `TodoNotFound` fault. Neither ever creates a record as a
/// side effect.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All live records. Adapters return them id-ascending, but callers
    /// must not rely on order.
    async fn list(&self) -> Result<Vec<Todo>>;

    async fn get(&self, id: i64) -> Result<Option<Todo>>;

    /// Persist a new record, returning it with its generated id.
    async fn insert(&self, new: NewTodo) -> Result<Todo>;

    /// Apply the present fields of `patch`, returning the updated record.
    async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo>;

    async fn delete(&self, id: i64) -> Result<()>;
}
