use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::{SqlitePoolOptions, SqliteRow}, Pool, Row, Sqlite};

use crate::domain::{
    repository::TodoRepository,
    todo::{CreateTodo, Todo, TodoId, TodoPatch},
};

#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTodoRepository {
    pub async fn connect(database_url: &str) -> Result<Self> {
        // A :memory: database exists per connection, so the pool must not grow past one.
        let max_connections = if database_url.starts_with("sqlite::memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool: Arc::new(pool) })
    }

    /// Sample rows, matching what the seed tool has always inserted.
    pub async fn seed(&self) -> Result<()> {
        for (title, completed) in [
            ("Learn axum", false),
            ("Set up sqlx", true),
            ("Build a todo app", false),
            ("Write acceptance tests", true),
        ] {
            sqlx::query("INSERT INTO todos (title, completed, created_at) VALUES (?1, ?2, ?3)")
                .bind(title)
                .bind(completed)
                .bind(Utc::now().to_rfc3339())
                .execute(&*self.pool)
                .await?;
        }
        Ok(())
    }

    async fn fetch(&self, id: TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query("SELECT id, title, completed, created_at FROM todos WHERE id = ?1")
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.map(row_to_todo))
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn create(&self, input: CreateTodo) -> Result<Todo> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO todos (title, completed, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(&input.title)
        .bind(false)
        .bind(now.to_rfc3339())
        .execute(&*self.pool)
        .await?;
        let id = TodoId(result.last_insert_rowid());
        Ok(Todo { id, title: input.title, completed: false, created_at: now })
    }

    async fn list(&self) -> Result<Vec<Todo>> {
        let rows = sqlx::query(
            "SELECT id, title, completed, created_at FROM todos ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_todo).collect())
    }

    async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Option<Todo>> {
        let existing = self.fetch(id).await?;
        let Some(mut todo) = existing else { return Ok(None) };

        if let Some(t) = patch.title { todo.title = t; }
        if let Some(c) = patch.completed { todo.completed = c; }

        sqlx::query("UPDATE todos SET title = ?2, completed = ?3 WHERE id = ?1")
            .bind(todo.id.0)
            .bind(&todo.title)
            .bind(todo.completed)
            .execute(&*self.pool)
            .await?;

        Ok(Some(todo))
    }

    async fn delete(&self, id: TodoId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id.0)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_todo(row: SqliteRow) -> Todo {
    let id: i64 = row.get("id");
    let title: String = row.get("title");
    let completed: bool = row.get("completed");
    let created_at_str: String = row.get("created_at");

    let created_at = DateTime::parse_from_rfc3339(&created_at_str).unwrap().with_timezone(&Utc);

    Todo { id: TodoId(id), title, completed, created_at }
}

/// Ensure a file-backed SQLite URL points at a creatable file before connecting.
pub fn prepare_sqlite_file(database_url: &str) -> Result<()> {
    if database_url.starts_with("sqlite::memory:") { return Ok(()); }
    if let Some(path) = database_url.strip_prefix("sqlite://") {
        // On Windows, absolute paths may look like /C:/path; strip the leading slash
        let path = if cfg!(windows) && path.len() >= 3 && path.as_bytes()[0] == b'/' && path.as_bytes()[2] == b':' {
            &path[1..]
        } else {
            path
        };
        use std::{fs, path::Path, fs::OpenOptions};
        let p = Path::new(path);
        if let Some(parent) = p.parent() { if !parent.as_os_str().is_empty() { fs::create_dir_all(parent)?; } }
        if !p.exists() {
            let _ = OpenOptions::new().create(true).append(true).open(p)?;
        }
    }
    Ok(())
}
