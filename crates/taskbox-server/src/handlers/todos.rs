//! Todo handlers
//!
//! JSON CRUD under /api/v1/todos, plus the rendered HTML listing at
//! /todos. All operands come from the request; missing update/delete
//! targets are a 404, never a silent no-op.

use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use taskbox_core::{NewTodo, TaskboxError, Todo, TodoPatch};

#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    todos: Vec<Todo>,
}

#[derive(Debug, Serialize)]
pub struct TodoResponse {
    todo: Todo,
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    title: Option<String>,
    description: Option<String>,
}

fn error_status(e: &TaskboxError) -> StatusCode {
    match e {
        TaskboxError::TodoNotFound(_) => StatusCode::NOT_FOUND,
        TaskboxError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<TodoListResponse>, StatusCode> {
    match state.store.list().await {
        Ok(todos) => Ok(Json(TodoListResponse { todos })),
        Err(e) => {
            tracing::error!("Failed to list todos: {}", e);
            Err(error_status(&e))
        }
    }
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TodoResponse>, StatusCode> {
    match state.store.get(id).await {
        Ok(Some(todo)) => Ok(Json(TodoResponse { todo })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get todo {}: {}", id, e);
            Err(error_status(&e))
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoResponse>), StatusCode> {
    let new = NewTodo::new(req.title, req.description);
    new.validate().map_err(|e| error_status(&e))?;

    match state.store.insert(new).await {
        Ok(todo) => Ok((StatusCode::CREATED, Json(TodoResponse { todo }))),
        Err(e) => {
            tracing::error!("Failed to create todo: {}", e);
            Err(error_status(&e))
        }
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTodoRequest>,
) -> Result<Json<TodoResponse>, StatusCode> {
    let patch = TodoPatch {
        title: req.title,
        description: req.description,
    };
    patch.validate().map_err(|e| error_status(&e))?;

    match state.store.update(id, patch).await {
        Ok(todo) => Ok(Json(TodoResponse { todo })),
        Err(e) if e.is_not_found() => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to update todo {}: {}", id, e);
            Err(error_status(&e))
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    match state.store.delete(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) if e.is_not_found() => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to delete todo {}: {}", id, e);
            Err(error_status(&e))
        }
    }
}

/// Render every todo as a `<p>title: <br>description</p>` fragment.
pub async fn list_html(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    match state.store.list().await {
        Ok(todos) => Ok(Html(render_todos(&todos))),
        Err(e) => {
            tracing::error!("Failed to list todos: {}", e);
            Err(error_status(&e))
        }
    }
}

fn render_todos(todos: &[Todo]) -> String {
    let mut body = String::new();
    for todo in todos {
        body.push_str(&format!(
            "<p>{}: <br>{}</p>",
            escape_html(&todo.title),
            escape_html(&todo.description)
        ));
    }
    body
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
