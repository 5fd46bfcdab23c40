//! Error types for Taskbox

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaskboxError>;

#[derive(Error, Debug)]
pub enum TaskboxError {
    #[error("Todo not found: {0}")]
    TodoNotFound(i64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TaskboxError {
    /// True when the error means the targeted record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TaskboxError::TodoNotFound(_))
    }
}
