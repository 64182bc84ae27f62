use axum::extract::Json;
use axum::response::IntoResponse;

/// GET handler for the liveness probe
#[allow(clippy::unused_async)]
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "OK" }))
}
