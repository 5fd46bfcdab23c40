//! SQLite database layer (embedded, no external dependencies)

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use taskbox_core::{NewTodo, TaskboxError, Todo, TodoPatch, TodoStore};

pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    pub async fn new(database_path: &str) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(database_path).parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Private in-memory database, used by tests. A single connection,
    /// since every in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("Failed to parse in-memory SQLite options")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

fn db_err(e: sqlx::Error) -> TaskboxError {
    TaskboxError::Database(e.to_string())
}

#[async_trait]
impl TodoStore for Database {
    async fn list(&self) -> taskbox_core::Result<Vec<Todo>> {
        let rows: Vec<TodoRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, created_at
            FROM todos
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn get(&self, id: i64) -> taskbox_core::Result<Option<Todo>> {
        let row: Option<TodoRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, created_at
            FROM todos WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(|r| r.into()))
    }

    async fn insert(&self, new: NewTodo) -> taskbox_core::Result<Todo> {
        let row: TodoRow = sqlx::query_as(
            r#"
            INSERT INTO todos (title, description)
            VALUES (?1, ?2)
            RETURNING id, title, description, created_at
            "#,
        )
        .bind(&new.title)
        .bind(&new.description)
        .fetch_one(&*self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.into())
    }

    async fn update(&self, id: i64, patch: TodoPatch) -> taskbox_core::Result<Todo> {
        let mut todo = self
            .get(id)
            .await?
            .ok_or(TaskboxError::TodoNotFound(id))?;
        patch.apply(&mut todo);

        sqlx::query(
            r#"
            UPDATE todos SET title = ?1, description = ?2
            WHERE id = ?3
            "#,
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(id)
        .execute(&*self.pool)
        .await
        .map_err(db_err)?;

        Ok(todo)
    }

    async fn delete(&self, id: i64) -> taskbox_core::Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&*self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(TaskboxError::TodoNotFound(id));
        }

        Ok(())
    }
}

// Helper struct for sqlx query_as
#[derive(sqlx::FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    description: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<TodoRow> for Todo {
    fn from(r: TodoRow) -> Self {
        Todo {
            id: r.id,
            title: r.title,
            description: r.description,
            created_at: r.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_get_returns_same_fields() {
        let db = Database::in_memory().await.unwrap();

        let created = db
            .insert(NewTodo::new("buy milk", "two liters"))
            .await
            .unwrap();
        let fetched = db.get(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.title, "buy milk");
        assert_eq!(fetched.description, "two liters");
        assert_eq!(fetched.id, created.id);
    }

    #[tokio::test]
    async fn get_missing_is_none_not_an_error() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.get(4).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_changes_title_and_keeps_other_fields() {
        let db = Database::in_memory().await.unwrap();

        let created = db
            .insert(NewTodo::new("old title", "cool hé"))
            .await
            .unwrap();
        let updated = db
            .update(created.id, TodoPatch::title("new title"))
            .await
            .unwrap();

        assert_eq!(updated.title, "new title");
        assert_eq!(updated.description, "cool hé");

        let fetched = db.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "new title");
        assert_eq!(fetched.description, "cool hé");
    }

    #[tokio::test]
    async fn update_missing_is_a_fault_and_creates_nothing() {
        let db = Database::in_memory().await.unwrap();

        let err = db.update(3, TodoPatch::title("new title")).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(db.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let db = Database::in_memory().await.unwrap();

        let created = db.insert(NewTodo::new("ephemeral", "")).await.unwrap();
        db.delete(created.id).await.unwrap();

        assert!(db.get(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_is_a_fault() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.delete(4).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn list_returns_exactly_the_live_records() {
        let db = Database::in_memory().await.unwrap();

        let a = db.insert(NewTodo::new("first", "a")).await.unwrap();
        let b = db.insert(NewTodo::new("second", "b")).await.unwrap();
        let c = db.insert(NewTodo::new("third", "c")).await.unwrap();
        db.delete(b.id).await.unwrap();

        let ids: Vec<i64> = db.list().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[tokio::test]
    async fn non_ascii_text_round_trips() {
        let db = Database::in_memory().await.unwrap();

        let created = db
            .insert(NewTodo::new("Hello from php script", "cool hé"))
            .await
            .unwrap();
        let fetched = db.get(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.description, "cool hé");
        assert_eq!(fetched.description.as_bytes(), "cool hé".as_bytes());
    }
}
