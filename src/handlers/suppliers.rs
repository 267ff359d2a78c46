use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse, PaginationParams, RequestContext,
};
use crate::{
    entities::supplier::{AccountType, SupplierKind},
    errors::ApiError,
    services::suppliers::{NewSupplier, SupplierChanges},
    AppState,
};

// Request and response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSupplierRequest {
    pub kind: SupplierKind,
    #[validate(length(min = 1, max = 200, message = "name must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(length(min = 11, max = 18, message = "tax id has an invalid length"))]
    pub tax_id: String,
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "phone is too long"))]
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "address is too long"))]
    pub address: Option<String>,
    #[validate(length(max = 100, message = "bank name is too long"))]
    pub bank_name: Option<String>,
    pub account_type: Option<AccountType>,
    pub branch_code: Option<String>,
    pub account_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSupplierRequest {
    pub kind: Option<SupplierKind>,
    #[validate(length(min = 1, max = 200, message = "name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    pub tax_id: Option<String>,
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bank_name: Option<String>,
    pub account_type: Option<AccountType>,
    pub branch_code: Option<String>,
    pub account_number: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SupplierQuery {
    /// Term matched against the supplier name or tax id digits
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

// Handler functions

/// Register a new supplier
#[utoipa::path(
    post,
    path = "/api/v1/suppliers",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Supplier created"),
        (status = 400, description = "Invalid tax id or bank data"),
        (status = 409, description = "Tax id already registered")
    ),
    tag = "suppliers"
)]
pub async fn create_supplier(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = NewSupplier {
        kind: payload.kind,
        name: payload.name,
        tax_id: payload.tax_id,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        bank_name: payload.bank_name,
        account_type: payload.account_type,
        branch_code: payload.branch_code,
        account_number: payload.account_number,
    };

    let supplier = state
        .services
        .suppliers
        .create(input, ctx.actor, ctx.client_ip.as_deref())
        .await
        .map_err(map_service_error)?;

    info!("Supplier created: {}", supplier.id);

    Ok(created_response(supplier))
}

/// Get a supplier by id
#[utoipa::path(
    get,
    path = "/api/v1/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "The supplier"),
        (status = 404, description = "Supplier not found")
    ),
    tag = "suppliers"
)]
pub async fn get_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let supplier = state
        .services
        .suppliers
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(supplier))
}

/// Update a supplier
#[utoipa::path(
    put,
    path = "/api/v1/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier id")),
    request_body = UpdateSupplierRequest,
    responses(
        (status = 200, description = "Updated supplier"),
        (status = 400, description = "Invalid tax id or bank data"),
        (status = 404, description = "Supplier not found")
    ),
    tag = "suppliers"
)]
pub async fn update_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<UpdateSupplierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let changes = SupplierChanges {
        kind: payload.kind,
        name: payload.name,
        tax_id: payload.tax_id,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        bank_name: payload.bank_name,
        account_type: payload.account_type,
        branch_code: payload.branch_code,
        account_number: payload.account_number,
    };

    let supplier = state
        .services
        .suppliers
        .update(id, changes, ctx.actor, ctx.client_ip.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(supplier))
}

/// Delete a supplier and, by cascade, its documents
#[utoipa::path(
    delete,
    path = "/api/v1/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 204, description = "Supplier deleted"),
        (status = 404, description = "Supplier not found")
    ),
    tag = "suppliers"
)]
pub async fn delete_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .suppliers
        .delete(id, ctx.actor, ctx.client_ip.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// List suppliers with search and pagination
#[utoipa::path(
    get,
    path = "/api/v1/suppliers",
    params(SupplierQuery),
    responses((status = 200, description = "Paginated supplier list")),
    tag = "suppliers"
)]
pub async fn list_suppliers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SupplierQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pagination = PaginationParams {
        page: query.page,
        per_page: query.per_page,
    };

    let (suppliers, total) = state
        .services
        .suppliers
        .list(
            query.search.as_deref(),
            pagination.page(),
            pagination.per_page(),
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        suppliers,
        pagination.page(),
        pagination.per_page(),
        total,
    )))
}

/// Creates the router for supplier endpoints
pub fn supplier_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_supplier))
        .route("/", get(list_suppliers))
        .route("/:id", get(get_supplier))
        .route("/:id", put(update_supplier))
        .route("/:id", delete(delete_supplier))
}
