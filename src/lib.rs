//! DocFinance API Library
//!
//! Municipal financial-document tracking: suppliers, the document ledger,
//! workflow stages with history, budget categories, audit logging and
//! administrative reports.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod codes;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod ledger;
pub mod openapi;
pub mod services;
pub mod validators;
pub mod workflow;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: services::AppServices,
}

/// All versioned API routes
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/suppliers", handlers::suppliers::supplier_routes())
        .nest("/documents", handlers::documents::document_routes())
        .nest("/budget", handlers::budget::budget_routes())
        .nest("/reports", handlers::reports::report_routes())
        .nest("/activity", handlers::activity::activity_routes())
        .nest("/health", handlers::health::health_routes())
}

/// Full application router: status root, v1 API, Swagger UI and request
/// tracing. Transport-level layers (CORS, compression, timeouts) are applied
/// by the binary.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "docfinance-api up" }))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
