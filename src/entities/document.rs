use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of financial document.
///
/// The kind decides which tax fields the document may carry: plain invoices
/// and bills never carry service/withholding taxes, so those amounts are
/// forced to zero during derivation.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(4))")]
pub enum DocumentKind {
    /// Nota Fiscal
    #[sea_orm(string_value = "NF")]
    #[serde(rename = "NF")]
    Invoice,
    /// Nota Fiscal de Serviço
    #[sea_orm(string_value = "NFS")]
    #[serde(rename = "NFS")]
    ServiceInvoice,
    /// Nota Fiscal de Serviço Avulsa
    #[sea_orm(string_value = "NFSA")]
    #[serde(rename = "NFSA")]
    StandaloneServiceInvoice,
    /// Fatura
    #[sea_orm(string_value = "FAT")]
    #[serde(rename = "FAT")]
    Bill,
    /// Recibo
    #[sea_orm(string_value = "REC")]
    #[serde(rename = "REC")]
    Receipt,
}

impl DocumentKind {
    /// Whether this kind of document carries ISS/IRRF withholding amounts.
    pub fn carries_withholding(&self) -> bool {
        !matches!(self, DocumentKind::Invoice | DocumentKind::Bill)
    }
}

/// Payment state of a document, independent of its workflow stage
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(3))")]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[sea_orm(string_value = "PEN")]
    Pending,
    #[sea_orm(string_value = "PAG")]
    Paid,
    #[sea_orm(string_value = "ATR")]
    Overdue,
}

/// Position of a document in the administrative workflow.
///
/// The canonical order (Opening → Internal Review → Commitment → Payment →
/// Writeoff) decides whether a transition is a forward move or a return;
/// see [`crate::workflow`].
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum DocumentStage {
    #[sea_orm(string_value = "ABERTURA")]
    Opening,
    #[sea_orm(string_value = "CONTROLE_INTERNO")]
    InternalReview,
    #[sea_orm(string_value = "EMPENHO")]
    Commitment,
    #[sea_orm(string_value = "PAGAMENTO")]
    Payment,
    #[sea_orm(string_value = "BAIXA")]
    Writeoff,
}

/// A financial document with monetary, payment-status and workflow fields.
///
/// `number` is the system-assigned unique identifier (timestamp prefix plus
/// daily sequence); `external_number` is whatever number the paper document
/// itself carries. `entered_at` is set once at creation and never changes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub number: String,
    pub external_number: Option<String>,
    pub kind: DocumentKind,
    pub supplier_id: Uuid,
    pub budget_unit_id: Option<Uuid>,
    pub budget_line_id: Option<Uuid>,
    pub document_date: Date,
    pub payment_date: Option<Date>,
    pub entered_at: DateTime<Utc>,
    pub gross_amount: Decimal,
    pub service_tax_amount: Decimal,
    pub withholding_tax_amount: Decimal,
    pub net_amount: Decimal,
    pub description: Option<String>,
    pub process_number: Option<String>,
    pub status: DocumentStatus,
    pub stage: DocumentStage,
    pub settled_at: Option<DateTime<Utc>>,
    pub settled_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id",
        on_delete = "Cascade"
    )]
    Supplier,
    #[sea_orm(
        belongs_to = "super::budget_unit::Entity",
        from = "Column::BudgetUnitId",
        to = "super::budget_unit::Column::Id",
        on_delete = "SetNull"
    )]
    BudgetUnit,
    #[sea_orm(
        belongs_to = "super::budget_line::Entity",
        from = "Column::BudgetLineId",
        to = "super::budget_line::Column::Id",
        on_delete = "SetNull"
    )]
    BudgetLine,
    #[sea_orm(has_many = "super::document_stage_history::Entity")]
    StageHistory,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::budget_unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetUnit.def()
    }
}

impl Related<super::budget_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetLine.def()
    }
}

impl Related<super::document_stage_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StageHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
