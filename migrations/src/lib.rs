pub use sea_orm_migration::prelude::*;

mod m20240115_000001_create_suppliers_table;
mod m20240115_000002_create_budget_tables;
mod m20240115_000003_create_documents_table;
mod m20240115_000004_create_stage_history_table;
mod m20240115_000005_create_activity_log_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240115_000001_create_suppliers_table::Migration),
            Box::new(m20240115_000002_create_budget_tables::Migration),
            Box::new(m20240115_000003_create_documents_table::Migration),
            Box::new(m20240115_000004_create_stage_history_table::Migration),
            Box::new(m20240115_000005_create_activity_log_table::Migration),
        ]
    }
}
