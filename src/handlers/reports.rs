use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Router};

use super::common::{map_service_error, success_response};
use crate::{errors::ApiError, AppState};

/// Dashboard summary: counts and net totals per status, recent documents
#[utoipa::path(
    get,
    path = "/api/v1/reports/dashboard",
    responses((status = 200, description = "Dashboard summary")),
    tag = "reports"
)]
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .services
        .reports
        .dashboard()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(report))
}

/// Net totals grouped by budget unit
#[utoipa::path(
    get,
    path = "/api/v1/reports/by-budget-unit",
    responses((status = 200, description = "Totals per budget unit")),
    tag = "reports"
)]
pub async fn by_budget_unit(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let totals = state
        .services
        .reports
        .totals_by_budget_unit()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(totals))
}

/// Creates the router for report endpoints
pub fn report_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/by-budget-unit", get(by_budget_unit))
}
