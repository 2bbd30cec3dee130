use axum::{routing::any, Json, Router};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

/// Legacy greeting endpoint. Unrelated to the todos resource; it keeps its
/// own `{"message": …}` body shape and explicit method check.
pub fn router() -> Router {
    Router::new().route("/api/greet", any(greet))
}

#[derive(Deserialize)]
struct GreetBody { name: Option<String> }

async fn greet(method: Method, body: Option<Json<GreetBody>>) -> Response {
    if method != Method::POST {
        return (StatusCode::METHOD_NOT_ALLOWED, Json(json!({ "message": "Method not allowed" }))).into_response();
    }
    match body.and_then(|Json(b)| b.name) {
        Some(name) if !name.is_empty() => {
            (StatusCode::OK, Json(json!({ "message": format!("Hello, {name}!") }))).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, Json(json!({ "message": "Name is required" }))).into_response(),
    }
}
