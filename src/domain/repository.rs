use async_trait::async_trait;
use super::todo::{CreateTodo, Todo, TodoId, TodoPatch};

#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    async fn create(&self, input: CreateTodo) -> anyhow::Result<Todo>;
    /// All records, newest first.
    async fn list(&self) -> anyhow::Result<Vec<Todo>>;
    /// Returns `None` when no record has the given id.
    async fn update(&self, id: TodoId, patch: TodoPatch) -> anyhow::Result<Option<Todo>>;
    async fn delete(&self, id: TodoId) -> anyhow::Result<bool>;
}
