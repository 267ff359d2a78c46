use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Funding source (recurso) inside a budget unit.
///
/// `code` is the owning unit's code plus a slug of the line name, unique
/// across all lines. Lines are deleted together with their unit.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_unit_id: Uuid,
    pub name: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget_unit::Entity",
        from = "Column::BudgetUnitId",
        to = "super::budget_unit::Column::Id",
        on_delete = "Cascade"
    )]
    BudgetUnit,
    #[sea_orm(has_many = "super::document::Entity")]
    Documents,
}

impl Related<super::budget_unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetUnit.def()
    }
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
