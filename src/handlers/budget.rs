use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    RequestContext,
};
use crate::{
    entities::{budget_line, budget_unit},
    errors::ApiError,
    AppState,
};

// Request and response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBudgetUnitRequest {
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBudgetLineRequest {
    pub budget_unit_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameRequest {
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: String,
}

/// A budget unit together with its lines
#[derive(Debug, Serialize)]
pub struct BudgetUnitWithLines {
    #[serde(flatten)]
    pub unit: budget_unit::Model,
    pub lines: Vec<budget_line::Model>,
}

// Handler functions

/// Register a budget unit; its code is generated from the name
#[utoipa::path(
    post,
    path = "/api/v1/budget/units",
    request_body = CreateBudgetUnitRequest,
    responses(
        (status = 201, description = "Budget unit created"),
        (status = 409, description = "Name already registered")
    ),
    tag = "budget"
)]
pub async fn create_unit(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Json(payload): Json<CreateBudgetUnitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let unit = state
        .services
        .budget
        .create_unit(&payload.name, ctx.actor, ctx.client_ip.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(created_response(unit))
}

/// List budget units with their lines
#[utoipa::path(
    get,
    path = "/api/v1/budget/units",
    responses((status = 200, description = "Units with nested lines")),
    tag = "budget"
)]
pub async fn list_units(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let units = state
        .services
        .budget
        .list_units()
        .await
        .map_err(map_service_error)?;

    let body: Vec<BudgetUnitWithLines> = units
        .into_iter()
        .map(|(unit, lines)| BudgetUnitWithLines { unit, lines })
        .collect();

    Ok(success_response(body))
}

/// Rename a budget unit (the code stays stable)
#[utoipa::path(
    put,
    path = "/api/v1/budget/units/{id}",
    params(("id" = Uuid, Path, description = "Budget unit id")),
    request_body = RenameRequest,
    responses(
        (status = 200, description = "Updated unit"),
        (status = 404, description = "Budget unit not found")
    ),
    tag = "budget"
)]
pub async fn rename_unit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<RenameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let unit = state
        .services
        .budget
        .rename_unit(id, &payload.name, ctx.actor, ctx.client_ip.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(unit))
}

/// Delete a budget unit and its lines
#[utoipa::path(
    delete,
    path = "/api/v1/budget/units/{id}",
    params(("id" = Uuid, Path, description = "Budget unit id")),
    responses(
        (status = 204, description = "Budget unit deleted"),
        (status = 404, description = "Budget unit not found")
    ),
    tag = "budget"
)]
pub async fn delete_unit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .budget
        .delete_unit(id, ctx.actor, ctx.client_ip.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Register a budget line under a unit
#[utoipa::path(
    post,
    path = "/api/v1/budget/lines",
    request_body = CreateBudgetLineRequest,
    responses(
        (status = 201, description = "Budget line created"),
        (status = 404, description = "Budget unit not found")
    ),
    tag = "budget"
)]
pub async fn create_line(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Json(payload): Json<CreateBudgetLineRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let line = state
        .services
        .budget
        .create_line(
            payload.budget_unit_id,
            &payload.name,
            ctx.actor,
            ctx.client_ip.as_deref(),
        )
        .await
        .map_err(map_service_error)?;

    Ok(created_response(line))
}

/// Rename a budget line (the code stays stable)
#[utoipa::path(
    put,
    path = "/api/v1/budget/lines/{id}",
    params(("id" = Uuid, Path, description = "Budget line id")),
    request_body = RenameRequest,
    responses(
        (status = 200, description = "Updated line"),
        (status = 404, description = "Budget line not found")
    ),
    tag = "budget"
)]
pub async fn rename_line(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<RenameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let line = state
        .services
        .budget
        .rename_line(id, &payload.name, ctx.actor, ctx.client_ip.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(line))
}

/// Delete a budget line
#[utoipa::path(
    delete,
    path = "/api/v1/budget/lines/{id}",
    params(("id" = Uuid, Path, description = "Budget line id")),
    responses(
        (status = 204, description = "Budget line deleted"),
        (status = 404, description = "Budget line not found")
    ),
    tag = "budget"
)]
pub async fn delete_line(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .budget
        .delete_line(id, ctx.actor, ctx.client_ip.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Creates the router for budget category endpoints
pub fn budget_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/units", post(create_unit))
        .route("/units", get(list_units))
        .route("/units/:id", put(rename_unit))
        .route("/units/:id", delete(delete_unit))
        .route("/lines", post(create_line))
        .route("/lines/:id", put(rename_line))
        .route("/lines/:id", delete(delete_line))
}
