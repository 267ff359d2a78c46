use sea_orm_migration::prelude::*;

use crate::m20240115_000003_create_documents_table::Documents;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DocumentStageHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentStageHistory::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DocumentStageHistory::DocumentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DocumentStageHistory::Stage)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(DocumentStageHistory::Note).text().not_null())
                    .col(ColumnDef::new(DocumentStageHistory::ActorId).uuid().null())
                    .col(
                        ColumnDef::new(DocumentStageHistory::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_document_stage_history_document_id")
                            .from(
                                DocumentStageHistory::Table,
                                DocumentStageHistory::DocumentId,
                            )
                            .to(Documents::Table, Documents::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_document_stage_history_document_id")
                    .table(DocumentStageHistory::Table)
                    .col(DocumentStageHistory::DocumentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_document_stage_history_recorded_at")
                    .table(DocumentStageHistory::Table)
                    .col(DocumentStageHistory::RecordedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DocumentStageHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DocumentStageHistory {
    Table,
    Id,
    DocumentId,
    Stage,
    Note,
    ActorId,
    RecordedAt,
}
