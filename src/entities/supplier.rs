use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Legal nature of a supplier, selecting which tax id applies (CPF or CNPJ)
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(2))")]
#[serde(rename_all = "snake_case")]
pub enum SupplierKind {
    /// Natural person, identified by an 11-digit CPF
    #[sea_orm(string_value = "PF")]
    Individual,
    /// Legal entity, identified by a 14-digit CNPJ
    #[sea_orm(string_value = "PJ")]
    Company,
}

/// Bank account type for payment data
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(2))")]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[sea_orm(string_value = "CC")]
    Checking,
    #[sea_orm(string_value = "PP")]
    Savings,
}

/// A payee (individual or organization) documents are issued against.
///
/// `tax_id` is stored digits-only and is unique across suppliers.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suppliers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::document::Entity")]
    Documents,
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Tax id formatted for display (000.000.000-00 / 00.000.000/0000-00)
    pub fn formatted_tax_id(&self) -> String {
        match self.kind {
            SupplierKind::Individual => crate::validators::format_cpf(&self.tax_id),
            SupplierKind::Company => crate::validators::format_cnpj(&self.tax_id),
        }
    }
}
