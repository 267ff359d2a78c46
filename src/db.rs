use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::AppConfig;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Establish a connection pool from the application configuration.
pub async fn establish_connection(cfg: &AppConfig) -> Result<DbPool, DbErr> {
    let mut options = ConnectOptions::new(cfg.database_url.clone());
    options
        .max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    let pool = Database::connect(options).await?;
    info!("Database connection established");
    Ok(pool)
}

/// Apply all pending migrations.
pub async fn run_migrations(db: &DbPool) -> Result<(), DbErr> {
    migrations::Migrator::up(db, None).await?;
    info!("Database migrations applied");
    Ok(())
}
