use anyhow::Result;
use async_trait::async_trait;

use crate::application::todo_service::TodoService;
use crate::domain::todo::{CreateTodo, Todo, TodoId, TodoPatch};

/// `TodoService` over the HTTP surface; what the terminal front end plugs
/// into the view-model so every user action travels the real wire contract.
///
/// The server reports unknown ids as failures, so `Ok` values are always
/// hits.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http: reqwest::Client::new(), base_url }
    }

    fn todos_url(&self) -> String { format!("{}/api/todos", self.base_url) }
}

#[async_trait]
impl TodoService for ApiClient {
    async fn create(&self, input: CreateTodo) -> Result<Todo> {
        let res = self
            .http
            .post(self.todos_url())
            .json(&serde_json::json!({ "title": input.title }))
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    async fn list(&self) -> Result<Vec<Todo>> {
        let res = self.http.get(self.todos_url()).send().await?.error_for_status()?;
        Ok(res.json().await?)
    }

    async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Option<Todo>> {
        let mut body = serde_json::json!({ "id": id.0 });
        if let Some(title) = patch.title { body["title"] = title.into(); }
        if let Some(completed) = patch.completed { body["completed"] = completed.into(); }
        let res = self.http.put(self.todos_url()).json(&body).send().await?.error_for_status()?;
        Ok(Some(res.json().await?))
    }

    async fn delete(&self, id: TodoId) -> Result<bool> {
        self.http
            .delete(self.todos_url())
            .json(&serde_json::json!({ "id": id.0 }))
            .send()
            .await?
            .error_for_status()?;
        Ok(true)
    }
}
