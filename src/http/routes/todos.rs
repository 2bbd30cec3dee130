use axum::{extract::State, routing::get, Json, Router};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::application::todo_service::TodoService;
use crate::domain::todo::{CreateTodo, Todo, TodoId, TodoPatch};
use crate::http::types::ApiError;

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

/// One resource path; PUT and DELETE carry the id in the body.
pub fn router<S: TodoService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route(
            "/api/todos",
            get(list_todos::<S>)
                .post(create_todo::<S>)
                .put(update_todo::<S>)
                .delete(delete_todo::<S>),
        )
        .with_state(state)
}

async fn list_todos<S: TodoService>(State(state): State<AppState<S>>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.service.list().await.map_err(|e| storage_error(e, "Failed to fetch todos"))?;
    Ok(Json(todos))
}

#[derive(Deserialize)]
struct CreateBody { title: Option<String> }

async fn create_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let title = match body.title {
        Some(t) if !t.is_empty() => t,
        _ => return Err(ApiError::validation("Please enter a text")),
    };
    let todo = state
        .service
        .create(CreateTodo { title })
        .await
        .map_err(|e| storage_error(e, "Failed to create todo"))?;
    Ok((StatusCode::CREATED, Json(todo)))
}

#[derive(Deserialize)]
struct UpdateBody {
    id: Option<i64>,
    title: Option<String>,
    completed: Option<bool>,
}

async fn update_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<Todo>, ApiError> {
    let Some(id) = body.id else { return Err(ApiError::validation("ID is required")) };
    let patch = TodoPatch { title: body.title, completed: body.completed };
    let updated = state
        .service
        .update(TodoId(id), patch)
        .await
        .map_err(|e| storage_error(e, "Failed to update todo"))?;
    // An unknown id surfaces as a storage failure, not a 404.
    updated.map(Json).ok_or_else(|| ApiError::internal("Failed to update todo"))
}

#[derive(Deserialize)]
struct DeleteBody { id: Option<i64> }

async fn delete_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    Json(body): Json<DeleteBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(id) = body.id else { return Err(ApiError::validation("ID is required")) };
    let deleted = state
        .service
        .delete(TodoId(id))
        .await
        .map_err(|e| storage_error(e, "Failed to delete todo"))?;
    if deleted {
        Ok(Json(serde_json::json!({ "success": true })))
    } else {
        Err(ApiError::internal("Failed to delete todo"))
    }
}

fn storage_error(err: anyhow::Error, message: &str) -> ApiError {
    tracing::error!(error = %err, "storage operation failed");
    ApiError::internal(message)
}
