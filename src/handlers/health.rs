use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use sea_orm::ConnectionTrait;
use serde_json::json;

use crate::AppState;

/// Liveness: the process is up
#[utoipa::path(
    get,
    path = "/api/v1/health/live",
    responses((status = 200, description = "Service is alive")),
    tag = "health"
)]
pub async fn live() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Readiness: the database answers
#[utoipa::path(
    get,
    path = "/api/v1/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Database unreachable")
    ),
    tag = "health"
)]
pub async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state
        .db
        .execute_unprepared("SELECT 1")
        .await
    {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable", "error": e.to_string() })),
        ),
    }
}

/// Creates the router for health endpoints
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/live", get(live))
        .route("/ready", get(ready))
}
