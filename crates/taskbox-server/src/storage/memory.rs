//! In-memory store using DashMap (no persistence)
//!
//! Backs handler tests and dev runs without a database file.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use taskbox_core::{NewTodo, Result, TaskboxError, Todo, TodoPatch, TodoStore};

pub struct MemoryStore {
    data: Arc<DashMap<i64, Todo>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Todo>> {
        let mut todos: Vec<Todo> = self.data.iter().map(|e| e.value().clone()).collect();
        todos.sort_by_key(|t| t.id);
        Ok(todos)
    }

    async fn get(&self, id: i64) -> Result<Option<Todo>> {
        Ok(self.data.get(&id).map(|e| e.value().clone()))
    }

    async fn insert(&self, new: NewTodo) -> Result<Todo> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let todo = Todo {
            id,
            title: new.title,
            description: new.description,
            created_at: Utc::now(),
        };
        self.data.insert(id, todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo> {
        let mut entry = self
            .data
            .get_mut(&id)
            .ok_or(TaskboxError::TodoNotFound(id))?;
        patch.apply(entry.value_mut());
        Ok(entry.value().clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.data
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskboxError::TodoNotFound(id))
    }
}
