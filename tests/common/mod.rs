// not every test binary uses every helper
#![allow(dead_code)]

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database};
use tokio::sync::mpsc;

use docfinance_api::{
    config::AppConfig,
    entities::supplier::{self, SupplierKind},
    events::{self, EventSender},
    services::{suppliers::NewSupplier, AppServices},
    AppState,
};

/// Well-known valid tax ids used across the suite
pub const VALID_CNPJ: &str = "11.222.333/0001-81";
pub const VALID_CPF: &str = "529.982.247-25";

/// Full service stack over an in-memory SQLite database with the real
/// migrations applied.
pub struct TestApp {
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        // a single pooled connection keeps the in-memory database shared
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.expect("connect to sqlite");
        docfinance_api::db::run_migrations(&db)
            .await
            .expect("apply migrations");
        let db = Arc::new(db);

        let (event_tx, event_rx) = mpsc::channel(64);
        tokio::spawn(events::process_events(event_rx));
        let event_sender = EventSender::new(event_tx);

        let services = AppServices::new(db.clone(), event_sender.clone());
        let state = Arc::new(AppState {
            db,
            config: test_config(),
            event_sender,
            services,
        });

        Self { state }
    }

    pub fn router(&self) -> axum::Router {
        docfinance_api::app_router(self.state.clone())
    }

    /// Registers a company supplier with a valid CNPJ.
    pub async fn seed_supplier(&self, name: &str) -> supplier::Model {
        self.state
            .services
            .suppliers
            .create(
                NewSupplier {
                    kind: SupplierKind::Company,
                    name: name.to_string(),
                    tax_id: VALID_CNPJ.to_string(),
                    email: None,
                    phone: None,
                    address: None,
                    bank_name: None,
                    account_type: None,
                    branch_code: None,
                    account_number: None,
                },
                None,
                None,
            )
            .await
            .expect("seed supplier")
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        auto_migrate: false,
        log_level: "warn".to_string(),
        log_json: false,
        cors_allowed_origins: None,
        request_timeout_secs: 5,
    }
}
