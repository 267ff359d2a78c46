use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::supplier::{self, AccountType, SupplierKind},
    errors::ServiceError,
    events::{Event, EventSender},
    services::audit::AuditSink,
    validators,
};

// Branch: 0000 or 0000-D; account: up to 11 digits, hyphen, check digit.
// The check digit may be the letter X in both.
static BRANCH_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}(-[\dXx])?$").expect("valid branch code pattern"));
static ACCOUNT_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,11}-[\dXx]$").expect("valid account number pattern"));

/// Fields accepted when registering a supplier
#[derive(Debug, Clone)]
pub struct NewSupplier {
    pub kind: SupplierKind,
    pub name: String,
    pub tax_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bank_name: Option<String>,
    pub account_type: Option<AccountType>,
    pub branch_code: Option<String>,
    pub account_number: Option<String>,
}

/// Fields accepted when updating a supplier; absent fields stay unchanged
#[derive(Debug, Clone, Default)]
pub struct SupplierChanges {
    pub kind: Option<SupplierKind>,
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bank_name: Option<String>,
    pub account_type: Option<AccountType>,
    pub branch_code: Option<String>,
    pub account_number: Option<String>,
}

/// Service for managing suppliers
#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DbPool>,
    event_sender: EventSender,
    audit: Arc<dyn AuditSink>,
}

impl SupplierService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            db,
            event_sender,
            audit,
        }
    }

    /// Registers a supplier after validating its tax id and bank data.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(
        &self,
        input: NewSupplier,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
    ) -> Result<supplier::Model, ServiceError> {
        let tax_id = validate_tax_id(&input.kind, &input.tax_id)?;
        validate_bank_fields(input.branch_code.as_deref(), input.account_number.as_deref())?;

        if self.find_by_tax_id(&tax_id).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "a supplier with tax id {} already exists",
                tax_id
            )));
        }

        let now = Utc::now();
        let model = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(input.kind),
            name: Set(input.name.trim().to_string()),
            tax_id: Set(tax_id),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            bank_name: Set(input.bank_name),
            account_type: Set(input.account_type),
            branch_code: Set(input.branch_code),
            account_number: Set(input.account_number),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let saved = model.insert(&*self.db).await?;

        info!("Supplier created: {}", saved.id);
        self.audit
            .record(
                actor,
                client_ip,
                "Supplier created",
                &format!("Supplier {} ({})", saved.name, saved.formatted_tax_id()),
            )
            .await;
        self.event_sender.send(Event::SupplierCreated(saved.id)).await;

        Ok(saved)
    }

    /// Updates a supplier; tax id and bank data are revalidated when touched.
    #[instrument(skip(self, changes), fields(supplier_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        changes: SupplierChanges,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
    ) -> Result<supplier::Model, ServiceError> {
        let mut model = self.get(id).await?;

        if let Some(kind) = changes.kind {
            model.kind = kind;
        }
        if let Some(name) = changes.name {
            model.name = name.trim().to_string();
        }
        if let Some(tax_id) = changes.tax_id {
            model.tax_id = tax_id;
        }
        // the tax id must match the (possibly new) kind
        model.tax_id = validate_tax_id(&model.kind, &model.tax_id)?;

        if let Some(other) = self.find_by_tax_id(&model.tax_id).await? {
            if other.id != id {
                return Err(ServiceError::Conflict(format!(
                    "a supplier with tax id {} already exists",
                    model.tax_id
                )));
            }
        }

        if let Some(email) = changes.email {
            model.email = Some(email);
        }
        if let Some(phone) = changes.phone {
            model.phone = Some(phone);
        }
        if let Some(address) = changes.address {
            model.address = Some(address);
        }
        if let Some(bank_name) = changes.bank_name {
            model.bank_name = Some(bank_name);
        }
        if let Some(account_type) = changes.account_type {
            model.account_type = Some(account_type);
        }
        if let Some(branch_code) = changes.branch_code {
            model.branch_code = Some(branch_code);
        }
        if let Some(account_number) = changes.account_number {
            model.account_number = Some(account_number);
        }
        validate_bank_fields(model.branch_code.as_deref(), model.account_number.as_deref())?;

        model.updated_at = Utc::now();

        let name = model.name.clone();
        let active = supplier::ActiveModel {
            id: sea_orm::ActiveValue::Unchanged(model.id),
            kind: Set(model.kind),
            name: Set(model.name),
            tax_id: Set(model.tax_id),
            email: Set(model.email),
            phone: Set(model.phone),
            address: Set(model.address),
            bank_name: Set(model.bank_name),
            account_type: Set(model.account_type),
            branch_code: Set(model.branch_code),
            account_number: Set(model.account_number),
            created_at: sea_orm::ActiveValue::Unchanged(model.created_at),
            updated_at: Set(model.updated_at),
        };
        let saved = active.update(&*self.db).await?;

        info!("Supplier updated: {}", id);
        self.audit
            .record(
                actor,
                client_ip,
                "Supplier updated",
                &format!("Supplier {}", name),
            )
            .await;
        self.event_sender.send(Event::SupplierUpdated(id)).await;

        Ok(saved)
    }

    /// Deletes a supplier; its documents are removed by the cascade.
    #[instrument(skip(self), fields(supplier_id = %id))]
    pub async fn delete(
        &self,
        id: Uuid,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
    ) -> Result<(), ServiceError> {
        let model = self.get(id).await?;

        supplier::Entity::delete_by_id(id).exec(&*self.db).await?;

        info!("Supplier deleted: {}", id);
        self.audit
            .record(
                actor,
                client_ip,
                "Supplier deleted",
                &format!("Supplier {} and its documents were removed", model.name),
            )
            .await;
        self.event_sender.send(Event::SupplierDeleted(id)).await;

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<supplier::Model, ServiceError> {
        supplier::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {} not found", id)))
    }

    /// Lists suppliers ordered by name, optionally filtered by a search term
    /// matched against the name or the tax id digits.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<supplier::Model>, u64), ServiceError> {
        let mut condition = Condition::all();
        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let digits = validators::normalize_digits(term);
            let mut any = Condition::any().add(supplier::Column::Name.contains(term));
            if !digits.is_empty() {
                any = any.add(supplier::Column::TaxId.contains(&digits));
            }
            condition = condition.add(any);
        }

        let paginator = supplier::Entity::find()
            .filter(condition)
            .order_by_asc(supplier::Column::Name)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let suppliers = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((suppliers, total))
    }

    async fn find_by_tax_id(&self, tax_id: &str) -> Result<Option<supplier::Model>, ServiceError> {
        supplier::Entity::find()
            .filter(supplier::Column::TaxId.eq(tax_id))
            .one(&*self.db)
            .await
            .map_err(ServiceError::from)
    }
}

/// Normalize a tax id to digits and run the checksum for the supplier kind.
fn validate_tax_id(kind: &SupplierKind, tax_id: &str) -> Result<String, ServiceError> {
    let digits = validators::normalize_digits(tax_id);
    let verdict = match kind {
        SupplierKind::Individual => validators::validate_cpf(&digits),
        SupplierKind::Company => validators::validate_cnpj(&digits),
    };
    verdict.map_err(|message| ServiceError::ValidationError(format!("tax_id: {message}")))?;
    Ok(digits)
}

fn validate_bank_fields(
    branch_code: Option<&str>,
    account_number: Option<&str>,
) -> Result<(), ServiceError> {
    if let Some(branch) = branch_code.map(str::trim).filter(|b| !b.is_empty()) {
        if !BRANCH_CODE_RE.is_match(branch) {
            return Err(ServiceError::ValidationError(
                "branch_code: expected 0000 or 0000-D (check digit may be X)".to_string(),
            ));
        }
    }
    if let Some(account) = account_number.map(str::trim).filter(|a| !a.is_empty()) {
        if !ACCOUNT_NUMBER_RE.is_match(account) {
            return Err(ServiceError::ValidationError(
                "account_number: expected digits, hyphen and a check digit (may be X)"
                    .to_string(),
            ));
        }
    }
    Ok(())
}
