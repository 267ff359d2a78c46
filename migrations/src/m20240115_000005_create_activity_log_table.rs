use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityLog::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ActivityLog::ActorId).uuid().null())
                    .col(ColumnDef::new(ActivityLog::Action).string_len(100).not_null())
                    .col(ColumnDef::new(ActivityLog::Details).text().not_null())
                    .col(ColumnDef::new(ActivityLog::ClientIp).string_len(45).null())
                    .col(
                        ColumnDef::new(ActivityLog::RecordedAt)
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
                    .name("idx_activity_log_recorded_at")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::RecordedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ActivityLog {
    Table,
    Id,
    ActorId,
    Action,
    Details,
    ClientIp,
    RecordedAt,
}
