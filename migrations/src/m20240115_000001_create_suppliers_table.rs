use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Suppliers::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Suppliers::Kind)
                            .string_len(2)
                            .not_null()
                            .default("PJ"),
                    )
                    .col(ColumnDef::new(Suppliers::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Suppliers::TaxId)
                            .string_len(14)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Suppliers::Email).string().null())
                    .col(ColumnDef::new(Suppliers::Phone).string_len(20).null())
                    .col(ColumnDef::new(Suppliers::Address).string_len(200).null())
                    .col(ColumnDef::new(Suppliers::BankName).string_len(100).null())
                    .col(ColumnDef::new(Suppliers::AccountType).string_len(2).null())
                    .col(ColumnDef::new(Suppliers::BranchCode).string_len(6).null())
                    .col(
                        ColumnDef::new(Suppliers::AccountNumber)
                            .string_len(13)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Suppliers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Suppliers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_suppliers_name")
                    .table(Suppliers::Table)
                    .col(Suppliers::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Suppliers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Suppliers {
    Table,
    Id,
    Kind,
    Name,
    TaxId,
    Email,
    Phone,
    Address,
    BankName,
    AccountType,
    BranchCode,
    AccountNumber,
    CreatedAt,
    UpdatedAt,
}
