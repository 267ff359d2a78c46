use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ActiveValue::Unchanged, ColumnTrait, Condition,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        budget_line, budget_unit,
        document::{self, DocumentKind, DocumentStage, DocumentStatus},
        supplier,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    ledger,
    services::audit::AuditSink,
};

/// Attempts at inserting with a freshly generated number before giving up.
/// Two documents entered within the same wall-clock second collide on the
/// unique number; regenerating picks up the other writer's sequence.
const MAX_NUMBER_ATTEMPTS: u32 = 3;

/// Fields accepted when entering a document
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub kind: DocumentKind,
    pub supplier_id: Uuid,
    pub external_number: Option<String>,
    pub budget_unit_id: Option<Uuid>,
    pub budget_line_id: Option<Uuid>,
    pub document_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub gross_amount: Decimal,
    pub service_tax_amount: Option<Decimal>,
    pub withholding_tax_amount: Option<Decimal>,
    pub description: Option<String>,
    pub process_number: Option<String>,
    pub status: Option<DocumentStatus>,
}

/// Fields accepted when editing a document; absent fields stay unchanged
#[derive(Debug, Clone, Default)]
pub struct DocumentChanges {
    pub kind: Option<DocumentKind>,
    pub supplier_id: Option<Uuid>,
    pub external_number: Option<String>,
    pub budget_unit_id: Option<Uuid>,
    pub budget_line_id: Option<Uuid>,
    pub document_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub gross_amount: Option<Decimal>,
    pub service_tax_amount: Option<Decimal>,
    pub withholding_tax_amount: Option<Decimal>,
    pub description: Option<String>,
    pub process_number: Option<String>,
    pub status: Option<DocumentStatus>,
}

/// Listing filters; all optional and combined with AND
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub status: Option<DocumentStatus>,
    pub kind: Option<DocumentKind>,
    pub stage: Option<DocumentStage>,
    pub supplier_id: Option<Uuid>,
    pub budget_unit_id: Option<Uuid>,
    pub search: Option<String>,
}

/// Service owning document entry, edits, listing and settlement
#[derive(Clone)]
pub struct DocumentService {
    db: Arc<DbPool>,
    event_sender: EventSender,
    audit: Arc<dyn AuditSink>,
}

impl DocumentService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            db,
            event_sender,
            audit,
        }
    }

    /// Enters a document: validates and derives its monetary fields, assigns
    /// the next daily number and persists it. A number collision under
    /// concurrent entry is retried with a regenerated number.
    #[instrument(skip(self, input), fields(kind = ?input.kind, supplier_id = %input.supplier_id))]
    pub async fn create(
        &self,
        input: NewDocument,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
    ) -> Result<document::Model, ServiceError> {
        let supplier = supplier::Entity::find_by_id(input.supplier_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Supplier {} not found", input.supplier_id))
            })?;

        let (budget_unit_id, budget_line_id) = self
            .resolve_budget_refs(input.budget_unit_id, input.budget_line_id)
            .await?;

        let mut model = document::Model {
            id: Uuid::new_v4(),
            number: String::new(),
            external_number: input.external_number,
            kind: input.kind,
            supplier_id: input.supplier_id,
            budget_unit_id,
            budget_line_id,
            document_date: input.document_date,
            payment_date: input.payment_date,
            entered_at: Utc::now(),
            gross_amount: input.gross_amount,
            // absent tax amounts count as zero, not as an error
            service_tax_amount: input.service_tax_amount.unwrap_or(Decimal::ZERO),
            withholding_tax_amount: input.withholding_tax_amount.unwrap_or(Decimal::ZERO),
            net_amount: Decimal::ZERO,
            description: input.description,
            process_number: input.process_number,
            status: input.status.unwrap_or(DocumentStatus::Pending),
            stage: DocumentStage::Opening,
            settled_at: None,
            settled_by: None,
        };
        ledger::validate_and_derive(&mut model)?;

        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            model.number = self.next_number().await?;

            match to_active_insert(&model).insert(&*self.db).await {
                Ok(saved) => {
                    info!("Document created: {} ({})", saved.number, saved.id);
                    self.audit
                        .record(
                            actor,
                            client_ip,
                            "Document created",
                            &format!(
                                "Document {} for supplier {}",
                                saved.number, supplier.name
                            ),
                        )
                        .await;
                    self.event_sender.send(Event::DocumentCreated(saved.id)).await;
                    return Ok(saved);
                }
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    warn!(attempt, "document number collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::Conflict(
            "could not assign a unique document number, please retry".to_string(),
        ))
    }

    /// Edits a document and re-runs validation/derivation before persisting.
    #[instrument(skip(self, changes), fields(document_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        changes: DocumentChanges,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
    ) -> Result<document::Model, ServiceError> {
        let mut model = self.get(id).await?;

        if let Some(supplier_id) = changes.supplier_id {
            supplier::Entity::find_by_id(supplier_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Supplier {} not found", supplier_id))
                })?;
            model.supplier_id = supplier_id;
        }
        if changes.budget_unit_id.is_some() || changes.budget_line_id.is_some() {
            let (unit, line) = self
                .resolve_budget_refs(
                    changes.budget_unit_id.or(model.budget_unit_id),
                    changes.budget_line_id.or(model.budget_line_id),
                )
                .await?;
            model.budget_unit_id = unit;
            model.budget_line_id = line;
        }
        if let Some(kind) = changes.kind {
            model.kind = kind;
        }
        if let Some(external_number) = changes.external_number {
            model.external_number = Some(external_number);
        }
        if let Some(document_date) = changes.document_date {
            model.document_date = document_date;
        }
        if let Some(payment_date) = changes.payment_date {
            model.payment_date = Some(payment_date);
        }
        if let Some(gross_amount) = changes.gross_amount {
            model.gross_amount = gross_amount;
        }
        if let Some(service_tax_amount) = changes.service_tax_amount {
            model.service_tax_amount = service_tax_amount;
        }
        if let Some(withholding_tax_amount) = changes.withholding_tax_amount {
            model.withholding_tax_amount = withholding_tax_amount;
        }
        if let Some(description) = changes.description {
            model.description = Some(description);
        }
        if let Some(process_number) = changes.process_number {
            model.process_number = Some(process_number);
        }
        if let Some(status) = changes.status {
            model.status = status;
        }

        ledger::validate_and_derive(&mut model)?;

        let saved = to_active_update(&model).update(&*self.db).await?;

        info!("Document updated: {}", saved.number);
        self.audit
            .record(
                actor,
                client_ip,
                "Document updated",
                &format!("Document {}", saved.number),
            )
            .await;
        self.event_sender.send(Event::DocumentUpdated(id)).await;

        Ok(saved)
    }

    /// Settles a pending document: marks it paid with the given payment date
    /// and records who settled it and when.
    #[instrument(skip(self), fields(document_id = %id))]
    pub async fn settle(
        &self,
        id: Uuid,
        payment_date: NaiveDate,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
    ) -> Result<document::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let mut model = document::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Document {} not found", id)))?;

        if model.status != DocumentStatus::Pending {
            return Err(ServiceError::InvalidOperation(
                "only pending documents can be settled".to_string(),
            ));
        }

        model.status = DocumentStatus::Paid;
        model.payment_date = Some(payment_date);
        model.settled_at = Some(Utc::now());
        model.settled_by = actor;
        ledger::validate_and_derive(&mut model)?;

        let saved = to_active_update(&model).update(&txn).await?;
        txn.commit().await?;

        info!(
            "Document {} settled, payment date {}",
            saved.number, payment_date
        );
        self.audit
            .record(
                actor,
                client_ip,
                "Document settled",
                &format!(
                    "Document {} paid on {}",
                    saved.number, payment_date
                ),
            )
            .await;
        self.event_sender
            .send(Event::DocumentSettled {
                document_id: id,
                settled_by: actor,
            })
            .await;

        Ok(saved)
    }

    /// Deletes a document and its stage history (by cascade).
    #[instrument(skip(self), fields(document_id = %id))]
    pub async fn delete(
        &self,
        id: Uuid,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
    ) -> Result<(), ServiceError> {
        let model = self.get(id).await?;

        document::Entity::delete_by_id(id).exec(&*self.db).await?;

        info!("Document deleted: {}", model.number);
        self.audit
            .record(
                actor,
                client_ip,
                "Document deleted",
                &format!("Document {} was removed", model.number),
            )
            .await;
        self.event_sender.send(Event::DocumentDeleted(id)).await;

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<document::Model, ServiceError> {
        document::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Document {} not found", id)))
    }

    /// Lists documents newest-first with optional filters. The search term
    /// matches the document number or the supplier name.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: DocumentFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<document::Model>, u64), ServiceError> {
        let mut condition = Condition::all();
        if let Some(status) = filter.status {
            condition = condition.add(document::Column::Status.eq(status));
        }
        if let Some(kind) = filter.kind {
            condition = condition.add(document::Column::Kind.eq(kind));
        }
        if let Some(stage) = filter.stage {
            condition = condition.add(document::Column::Stage.eq(stage));
        }
        if let Some(supplier_id) = filter.supplier_id {
            condition = condition.add(document::Column::SupplierId.eq(supplier_id));
        }
        if let Some(budget_unit_id) = filter.budget_unit_id {
            condition = condition.add(document::Column::BudgetUnitId.eq(budget_unit_id));
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let supplier_ids: Vec<Uuid> = supplier::Entity::find()
                .filter(supplier::Column::Name.contains(term))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|s| s.id)
                .collect();

            let mut any = Condition::any().add(document::Column::Number.contains(term));
            if !supplier_ids.is_empty() {
                any = any.add(document::Column::SupplierId.is_in(supplier_ids));
            }
            condition = condition.add(any);
        }

        let paginator = document::Entity::find()
            .filter(condition)
            .order_by_desc(document::Column::DocumentDate)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let documents = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((documents, total))
    }

    /// Generates the next document number from the most recent number
    /// entered today. The number embeds the local entry date, so the date
    /// prefix selects today's documents.
    async fn next_number(&self) -> Result<String, ServiceError> {
        let now = Local::now().naive_local();
        let today_prefix = now.format("%d%m%Y").to_string();

        let last = document::Entity::find()
            .filter(document::Column::Number.starts_with(&today_prefix))
            .order_by_desc(document::Column::Number)
            .one(&*self.db)
            .await?;

        Ok(ledger::generate_number(now, last.as_ref().map(|d| d.number.as_str())))
    }

    /// Checks that the referenced budget rows exist and agree: a line must
    /// belong to the selected unit; a line without a unit pins the unit.
    async fn resolve_budget_refs(
        &self,
        budget_unit_id: Option<Uuid>,
        budget_line_id: Option<Uuid>,
    ) -> Result<(Option<Uuid>, Option<Uuid>), ServiceError> {
        if let Some(unit_id) = budget_unit_id {
            budget_unit::Entity::find_by_id(unit_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Budget unit {} not found", unit_id))
                })?;
        }

        match budget_line_id {
            None => Ok((budget_unit_id, None)),
            Some(line_id) => {
                let line = budget_line::Entity::find_by_id(line_id)
                    .one(&*self.db)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Budget line {} not found", line_id))
                    })?;

                match budget_unit_id {
                    Some(unit_id) if unit_id != line.budget_unit_id => {
                        Err(ServiceError::ValidationError(
                            "budget_line_id: budget line does not belong to the selected budget unit"
                                .to_string(),
                        ))
                    }
                    _ => Ok((Some(line.budget_unit_id), Some(line_id))),
                }
            }
        }
    }
}

fn to_active_insert(model: &document::Model) -> document::ActiveModel {
    document::ActiveModel {
        id: Set(model.id),
        number: Set(model.number.clone()),
        external_number: Set(model.external_number.clone()),
        kind: Set(model.kind.clone()),
        supplier_id: Set(model.supplier_id),
        budget_unit_id: Set(model.budget_unit_id),
        budget_line_id: Set(model.budget_line_id),
        document_date: Set(model.document_date),
        payment_date: Set(model.payment_date),
        entered_at: Set(model.entered_at),
        gross_amount: Set(model.gross_amount),
        service_tax_amount: Set(model.service_tax_amount),
        withholding_tax_amount: Set(model.withholding_tax_amount),
        net_amount: Set(model.net_amount),
        description: Set(model.description.clone()),
        process_number: Set(model.process_number.clone()),
        status: Set(model.status.clone()),
        stage: Set(model.stage.clone()),
        settled_at: Set(model.settled_at),
        settled_by: Set(model.settled_by),
    }
}

fn to_active_update(model: &document::Model) -> document::ActiveModel {
    let mut active = to_active_insert(model);
    active.id = Unchanged(model.id);
    // number and entry timestamp are assigned once and never rewritten
    active.number = Unchanged(model.number.clone());
    active.entered_at = Unchanged(model.entered_at);
    active
}
