use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DocFinance API",
        version = "0.2.0",
        description = r#"
Municipal financial-document tracking API.

Registers suppliers (CPF/CNPJ validated), enters financial documents tied to
budget units and lines, derives their monetary fields, tracks payment status
and workflow stage with an append-only history, and produces administrative
reports.

The acting user is taken from the `x-user-id` header set by the upstream
gateway; the client address from `x-forwarded-for`. Both end up in the
activity log for every state-changing operation.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        crate::handlers::documents::create_document,
        crate::handlers::documents::list_documents,
        crate::handlers::documents::get_document,
        crate::handlers::documents::update_document,
        crate::handlers::documents::delete_document,
        crate::handlers::documents::settle_document,
        crate::handlers::documents::transition_stage,
        crate::handlers::documents::get_history,
        crate::handlers::documents::get_timeline,
        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::delete_supplier,
        crate::handlers::budget::create_unit,
        crate::handlers::budget::list_units,
        crate::handlers::budget::rename_unit,
        crate::handlers::budget::delete_unit,
        crate::handlers::budget::create_line,
        crate::handlers::budget::rename_line,
        crate::handlers::budget::delete_line,
        crate::handlers::reports::dashboard,
        crate::handlers::reports::by_budget_unit,
        crate::handlers::activity::list_activity,
        crate::handlers::health::live,
        crate::handlers::health::ready,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::entities::document::DocumentKind,
        crate::entities::document::DocumentStatus,
        crate::entities::document::DocumentStage,
        crate::entities::supplier::SupplierKind,
        crate::entities::supplier::AccountType,
        crate::workflow::ReturnReason,
        crate::handlers::documents::CreateDocumentRequest,
        crate::handlers::documents::UpdateDocumentRequest,
        crate::handlers::documents::SettleDocumentRequest,
        crate::handlers::documents::StageTransitionRequest,
        crate::handlers::suppliers::CreateSupplierRequest,
        crate::handlers::suppliers::UpdateSupplierRequest,
        crate::handlers::budget::CreateBudgetUnitRequest,
        crate::handlers::budget::CreateBudgetLineRequest,
        crate::handlers::budget::RenameRequest,
        crate::services::workflow::StageTimelineEntry,
        crate::services::reports::StatusTotals,
    )),
    tags(
        (name = "documents", description = "Document ledger and workflow"),
        (name = "suppliers", description = "Supplier registry"),
        (name = "budget", description = "Budget units and lines"),
        (name = "reports", description = "Administrative reports"),
        (name = "activity", description = "Audit activity log"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at /docs, serving the spec at /api-docs/openapi.json
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
