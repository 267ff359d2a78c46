use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse, RequestContext,
};
use crate::{
    entities::document::{DocumentKind, DocumentStage, DocumentStatus},
    errors::ApiError,
    services::documents::{DocumentChanges, DocumentFilter, NewDocument},
    services::workflow::StageTransition,
    workflow::ReturnReason,
    AppState,
};

// Request and response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDocumentRequest {
    pub kind: DocumentKind,
    pub supplier_id: Uuid,
    #[validate(length(max = 50, message = "external number is too long"))]
    pub external_number: Option<String>,
    pub budget_unit_id: Option<Uuid>,
    pub budget_line_id: Option<Uuid>,
    pub document_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub gross_amount: Decimal,
    pub service_tax_amount: Option<Decimal>,
    pub withholding_tax_amount: Option<Decimal>,
    #[validate(length(max = 2000, message = "description is too long"))]
    pub description: Option<String>,
    #[validate(length(max = 50, message = "process number is too long"))]
    pub process_number: Option<String>,
    pub status: Option<DocumentStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDocumentRequest {
    pub kind: Option<DocumentKind>,
    pub supplier_id: Option<Uuid>,
    #[validate(length(max = 50, message = "external number is too long"))]
    pub external_number: Option<String>,
    pub budget_unit_id: Option<Uuid>,
    pub budget_line_id: Option<Uuid>,
    pub document_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub gross_amount: Option<Decimal>,
    pub service_tax_amount: Option<Decimal>,
    pub withholding_tax_amount: Option<Decimal>,
    #[validate(length(max = 2000, message = "description is too long"))]
    pub description: Option<String>,
    #[validate(length(max = 50, message = "process number is too long"))]
    pub process_number: Option<String>,
    pub status: Option<DocumentStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SettleDocumentRequest {
    pub payment_date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StageTransitionRequest {
    pub stage: DocumentStage,
    pub reason: Option<ReturnReason>,
    #[validate(length(max = 500, message = "free text is too long"))]
    pub free_text: Option<String>,
    #[validate(length(max = 500, message = "note is too long"))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DocumentQuery {
    pub status: Option<DocumentStatus>,
    pub kind: Option<DocumentKind>,
    pub stage: Option<DocumentStage>,
    pub supplier_id: Option<Uuid>,
    pub budget_unit_id: Option<Uuid>,
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

/// Enter a new document
#[utoipa::path(
    post,
    path = "/api/v1/documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 201, description = "Document created"),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Supplier or budget reference not found")
    ),
    tag = "documents"
)]
pub async fn create_document(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Json(payload): Json<CreateDocumentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = NewDocument {
        kind: payload.kind,
        supplier_id: payload.supplier_id,
        external_number: payload.external_number,
        budget_unit_id: payload.budget_unit_id,
        budget_line_id: payload.budget_line_id,
        document_date: payload.document_date,
        payment_date: payload.payment_date,
        gross_amount: payload.gross_amount,
        service_tax_amount: payload.service_tax_amount,
        withholding_tax_amount: payload.withholding_tax_amount,
        description: payload.description,
        process_number: payload.process_number,
        status: payload.status,
    };

    let document = state
        .services
        .documents
        .create(input, ctx.actor, ctx.client_ip.as_deref())
        .await
        .map_err(map_service_error)?;

    info!("Document created: {}", document.number);

    Ok(created_response(document))
}

/// List documents with filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/documents",
    params(DocumentQuery),
    responses((status = 200, description = "Paginated document list")),
    tag = "documents"
)]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DocumentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page.max(1);
    let per_page = query.per_page.clamp(1, 100);
    let filter = DocumentFilter {
        status: query.status,
        kind: query.kind,
        stage: query.stage,
        supplier_id: query.supplier_id,
        budget_unit_id: query.budget_unit_id,
        search: query.search,
    };

    let (documents, total) = state
        .services
        .documents
        .list(filter, page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        documents, page, per_page, total,
    )))
}

/// Get a document by id
#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document"),
        (status = 404, description = "Document not found")
    ),
    tag = "documents"
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state
        .services
        .documents
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(document))
}

/// Update a document
#[utoipa::path(
    put,
    path = "/api/v1/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Updated document"),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Document not found")
    ),
    tag = "documents"
)]
pub async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<UpdateDocumentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let changes = DocumentChanges {
        kind: payload.kind,
        supplier_id: payload.supplier_id,
        external_number: payload.external_number,
        budget_unit_id: payload.budget_unit_id,
        budget_line_id: payload.budget_line_id,
        document_date: payload.document_date,
        payment_date: payload.payment_date,
        gross_amount: payload.gross_amount,
        service_tax_amount: payload.service_tax_amount,
        withholding_tax_amount: payload.withholding_tax_amount,
        description: payload.description,
        process_number: payload.process_number,
        status: payload.status,
    };

    let document = state
        .services
        .documents
        .update(id, changes, ctx.actor, ctx.client_ip.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(document))
}

/// Delete a document
#[utoipa::path(
    delete,
    path = "/api/v1/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 404, description = "Document not found")
    ),
    tag = "documents"
)]
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .documents
        .delete(id, ctx.actor, ctx.client_ip.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Settle a pending document (mark it paid)
#[utoipa::path(
    post,
    path = "/api/v1/documents/{id}/settle",
    params(("id" = Uuid, Path, description = "Document id")),
    request_body = SettleDocumentRequest,
    responses(
        (status = 200, description = "Settled document"),
        (status = 400, description = "Document is not pending"),
        (status = 404, description = "Document not found")
    ),
    tag = "documents"
)]
pub async fn settle_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<SettleDocumentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state
        .services
        .documents
        .settle(id, payload.payment_date, ctx.actor, ctx.client_ip.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(document))
}

/// Move a document to another workflow stage
#[utoipa::path(
    post,
    path = "/api/v1/documents/{id}/stage",
    params(("id" = Uuid, Path, description = "Document id")),
    request_body = StageTransitionRequest,
    responses(
        (status = 200, description = "Document and the appended history entry"),
        (status = 400, description = "Return without justification"),
        (status = 404, description = "Document not found")
    ),
    tag = "documents"
)]
pub async fn transition_stage(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<StageTransitionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let request = StageTransition {
        target: payload.stage,
        reason: payload.reason,
        free_text: payload.free_text,
        note: payload.note,
    };

    let (document, entry) = state
        .services
        .workflow
        .transition(id, request, ctx.actor, ctx.client_ip.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "document": document,
        "history_entry": entry,
    })))
}

/// Full stage history of a document, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}/history",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "History entries"),
        (status = 404, description = "Document not found")
    ),
    tag = "documents"
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state
        .services
        .workflow
        .history(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(entries))
}

/// Per-stage timeline of a document (latest entry per stage)
#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}/timeline",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Timeline entries in canonical stage order"),
        (status = 404, description = "Document not found")
    ),
    tag = "documents"
)]
pub async fn get_timeline(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let timeline = state
        .services
        .workflow
        .timeline(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(timeline))
}

/// Creates the router for document endpoints
pub fn document_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_document))
        .route("/", get(list_documents))
        .route("/:id", get(get_document))
        .route("/:id", put(update_document))
        .route("/:id", delete(delete_document))
        .route("/:id/settle", post(settle_document))
        .route("/:id/stage", post(transition_stage))
        .route("/:id/history", get(get_history))
        .route("/:id/timeline", get(get_timeline))
}
