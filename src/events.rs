//! Domain events and the asynchronous processing loop.
//!
//! Services emit events after their transaction commits; the processor runs
//! on a dedicated task and must never block request handling. Losing an
//! event degrades notifications, not correctness.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::document::DocumentStage;

/// Events emitted by the services after a successful state change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Supplier events
    SupplierCreated(Uuid),
    SupplierUpdated(Uuid),
    SupplierDeleted(Uuid),

    // Document events
    DocumentCreated(Uuid),
    DocumentUpdated(Uuid),
    DocumentDeleted(Uuid),
    DocumentSettled {
        document_id: Uuid,
        settled_by: Option<Uuid>,
    },
    DocumentStageChanged {
        document_id: Uuid,
        from: DocumentStage,
        to: DocumentStage,
        returned: bool,
    },

    // Budget category events
    BudgetUnitCreated(Uuid),
    BudgetUnitDeleted(Uuid),
    BudgetLineCreated(Uuid),
    BudgetLineDeleted(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Send an event to the processing loop. Failures are logged and
    /// swallowed: event delivery never fails a committed operation.
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!("failed to enqueue event: {}", e);
        }
    }
}

/// Consume events until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::DocumentSettled {
                document_id,
                settled_by,
            } => {
                info!(
                    document_id = %document_id,
                    settled_by = ?settled_by,
                    "document settled"
                );
            }
            Event::DocumentStageChanged {
                document_id,
                from,
                to,
                returned,
            } => {
                info!(
                    document_id = %document_id,
                    from = from.label(),
                    to = to.label(),
                    returned,
                    "document stage changed"
                );
            }
            other => {
                info!(event = ?other, "domain event");
            }
        }
    }

    info!("Event processing loop stopped");
}
