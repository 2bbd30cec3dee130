use crate::domain::repository::TodoRepository;
use crate::domain::todo::{CreateTodo, Todo, TodoId, TodoPatch};
use anyhow::Result;
use async_trait::async_trait;

/// Seam the HTTP handlers and the terminal client program against.
#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn create(&self, input: CreateTodo) -> Result<Todo>;
    async fn list(&self) -> Result<Vec<Todo>>;
    async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Option<Todo>>;
    async fn delete(&self, id: TodoId) -> Result<bool>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

#[async_trait]
impl<R: TodoRepository> TodoService for TodoServiceImpl<R> {
    async fn create(&self, input: CreateTodo) -> Result<Todo> { self.repo.create(input).await }
    async fn list(&self) -> Result<Vec<Todo>> { self.repo.list().await }
    async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Option<Todo>> { self.repo.update(id, patch).await }
    async fn delete(&self, id: TodoId) -> Result<bool> { self.repo.delete(id).await }
}
