pub mod audit;
pub mod budget;
pub mod documents;
pub mod reports;
pub mod suppliers;
pub mod workflow;

use std::sync::Arc;

use crate::{db::DbPool, events::EventSender};

/// Aggregate of the application services shared through [`crate::AppState`]
#[derive(Clone)]
pub struct AppServices {
    pub documents: Arc<documents::DocumentService>,
    pub workflow: Arc<workflow::WorkflowService>,
    pub suppliers: Arc<suppliers::SupplierService>,
    pub budget: Arc<budget::BudgetService>,
    pub reports: Arc<reports::ReportService>,
    pub activity: Arc<audit::ActivityLogService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        let activity = Arc::new(audit::ActivityLogService::new(db.clone()));
        let audit_sink: Arc<dyn audit::AuditSink> = activity.clone();

        Self {
            documents: Arc::new(documents::DocumentService::new(
                db.clone(),
                event_sender.clone(),
                audit_sink.clone(),
            )),
            workflow: Arc::new(workflow::WorkflowService::new(
                db.clone(),
                event_sender.clone(),
                audit_sink.clone(),
            )),
            suppliers: Arc::new(suppliers::SupplierService::new(
                db.clone(),
                event_sender.clone(),
                audit_sink.clone(),
            )),
            budget: Arc::new(budget::BudgetService::new(
                db.clone(),
                event_sender,
                audit_sink,
            )),
            reports: Arc::new(reports::ReportService::new(db.clone())),
            activity,
        }
    }
}
