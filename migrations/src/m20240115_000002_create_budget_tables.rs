use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BudgetUnits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetUnits::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetUnits::Name)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(BudgetUnits::Code)
                            .string_len(10)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(BudgetUnits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BudgetLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetLines::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BudgetLines::BudgetUnitId).uuid().not_null())
                    .col(ColumnDef::new(BudgetLines::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(BudgetLines::Code)
                            .string_len(30)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(BudgetLines::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budget_lines_budget_unit_id")
                            .from(BudgetLines::Table, BudgetLines::BudgetUnitId)
                            .to(BudgetUnits::Table, BudgetUnits::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_budget_lines_budget_unit_id")
                    .table(BudgetLines::Table)
                    .col(BudgetLines::BudgetUnitId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BudgetLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetUnits::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum BudgetUnits {
    Table,
    Id,
    Name,
    Code,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum BudgetLines {
    Table,
    Id,
    BudgetUnitId,
    Name,
    Code,
    CreatedAt,
}
