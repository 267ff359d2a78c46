use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};

use super::common::{map_service_error, success_response, PaginatedResponse, PaginationParams};
use crate::{errors::ApiError, AppState};

/// List activity log entries, most recent first
#[utoipa::path(
    get,
    path = "/api/v1/activity",
    params(PaginationParams),
    responses((status = 200, description = "Paginated activity log")),
    tag = "activity"
)]
pub async fn list_activity(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (entries, total) = state
        .services
        .activity
        .list(pagination.page(), pagination.per_page())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        entries,
        pagination.page(),
        pagination.per_page(),
        total,
    )))
}

/// Creates the router for activity log endpoints
pub fn activity_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_activity))
}
