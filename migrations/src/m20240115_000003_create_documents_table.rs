use sea_orm_migration::prelude::*;

use crate::m20240115_000001_create_suppliers_table::Suppliers;
use crate::m20240115_000002_create_budget_tables::{BudgetLines, BudgetUnits};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Documents::Number)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Documents::ExternalNumber)
                            .string_len(50)
                            .null(),
                    )
                    .col(ColumnDef::new(Documents::Kind).string_len(4).not_null())
                    .col(ColumnDef::new(Documents::SupplierId).uuid().not_null())
                    .col(ColumnDef::new(Documents::BudgetUnitId).uuid().null())
                    .col(ColumnDef::new(Documents::BudgetLineId).uuid().null())
                    .col(ColumnDef::new(Documents::DocumentDate).date().not_null())
                    .col(ColumnDef::new(Documents::PaymentDate).date().null())
                    .col(
                        ColumnDef::new(Documents::EnteredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Documents::GrossAmount)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Documents::ServiceTaxAmount)
                            .decimal_len(10, 2)
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Documents::WithholdingTaxAmount)
                            .decimal_len(10, 2)
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Documents::NetAmount)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Documents::Description).text().null())
                    .col(
                        ColumnDef::new(Documents::ProcessNumber)
                            .string_len(50)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Documents::Status)
                            .string_len(3)
                            .not_null()
                            .default("PEN"),
                    )
                    .col(
                        ColumnDef::new(Documents::Stage)
                            .string_len(20)
                            .not_null()
                            .default("ABERTURA"),
                    )
                    .col(
                        ColumnDef::new(Documents::SettledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Documents::SettledBy).uuid().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_supplier_id")
                            .from(Documents::Table, Documents::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_budget_unit_id")
                            .from(Documents::Table, Documents::BudgetUnitId)
                            .to(BudgetUnits::Table, BudgetUnits::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_budget_line_id")
                            .from(Documents::Table, Documents::BudgetLineId)
                            .to(BudgetLines::Table, BudgetLines::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_documents_document_date")
                    .table(Documents::Table)
                    .col(Documents::DocumentDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_documents_status")
                    .table(Documents::Table)
                    .col(Documents::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_documents_supplier_id")
                    .table(Documents::Table)
                    .col(Documents::SupplierId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_documents_entered_at")
                    .table(Documents::Table)
                    .col(Documents::EnteredAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Documents {
    Table,
    Id,
    Number,
    ExternalNumber,
    Kind,
    SupplierId,
    BudgetUnitId,
    BudgetLineId,
    DocumentDate,
    PaymentDate,
    EnteredAt,
    GrossAmount,
    ServiceTaxAmount,
    WithholdingTaxAmount,
    NetAmount,
    Description,
    ProcessNumber,
    Status,
    Stage,
    SettledAt,
    SettledBy,
}
