use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        document::{self, DocumentStage},
        document_stage_history,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::audit::AuditSink,
    workflow::{self, ReturnReason, STAGE_SEQUENCE},
};

/// A requested stage transition
#[derive(Debug, Clone)]
pub struct StageTransition {
    pub target: DocumentStage,
    pub reason: Option<ReturnReason>,
    pub free_text: Option<String>,
    pub note: Option<String>,
}

/// One row of the per-stage timeline view: the latest history entry per
/// stage, with stages up to the current one flagged as completed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StageTimelineEntry {
    pub stage: DocumentStage,
    pub label: String,
    pub completed: bool,
    pub recorded_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

/// Service governing stage transitions and the append-only history
#[derive(Clone)]
pub struct WorkflowService {
    db: Arc<DbPool>,
    event_sender: EventSender,
    audit: Arc<dyn AuditSink>,
}

impl WorkflowService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            db,
            event_sender,
            audit,
        }
    }

    /// Moves a document to `target` and appends a history entry, in one
    /// transaction. Returns to an earlier stage require justification; the
    /// history note is composed by the workflow policy.
    #[instrument(skip(self, request), fields(document_id = %document_id, target = ?request.target))]
    pub async fn transition(
        &self,
        document_id: Uuid,
        request: StageTransition,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
    ) -> Result<(document::Model, document_stage_history::Model), ServiceError> {
        let txn = self.db.begin().await?;

        let model = document::Entity::find_by_id(document_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Document {} not found", document_id))
            })?;

        let from = model.stage.clone();
        let returned = workflow::is_return(from.clone(), request.target.clone());
        let note = workflow::transition_note(
            from.clone(),
            request.target.clone(),
            request.reason,
            request.free_text.as_deref(),
            request.note.as_deref(),
        )?;

        let mut active: document::ActiveModel = model.into();
        active.stage = Set(request.target.clone());
        let updated = active.update(&txn).await?;

        let entry = document_stage_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            document_id: Set(document_id),
            stage: Set(request.target.clone()),
            note: Set(note),
            actor_id: Set(actor),
            recorded_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            "Document {} moved from {} to {}",
            updated.number,
            from.label(),
            request.target.label()
        );
        let action = if returned {
            "Document stage returned"
        } else {
            "Document stage advanced"
        };
        self.audit
            .record(
                actor,
                client_ip,
                action,
                &format!(
                    "Document {} moved from {} to {}",
                    updated.number,
                    from.label(),
                    request.target.label()
                ),
            )
            .await;
        self.event_sender
            .send(Event::DocumentStageChanged {
                document_id,
                from,
                to: request.target,
                returned,
            })
            .await;

        Ok((updated, entry))
    }

    /// Full history of a document, oldest first.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn history(
        &self,
        document_id: Uuid,
    ) -> Result<Vec<document_stage_history::Model>, ServiceError> {
        self.require_document(document_id).await?;

        document_stage_history::Entity::find()
            .filter(document_stage_history::Column::DocumentId.eq(document_id))
            .order_by_asc(document_stage_history::Column::RecordedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::from)
    }

    /// Per-stage timeline: the latest entry per stage wins; the opening
    /// stage falls back to the document's entry timestamp when no history
    /// exists for it yet.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn timeline(
        &self,
        document_id: Uuid,
    ) -> Result<Vec<StageTimelineEntry>, ServiceError> {
        let model = self.require_document(document_id).await?;
        let entries = document_stage_history::Entity::find()
            .filter(document_stage_history::Column::DocumentId.eq(document_id))
            .order_by_asc(document_stage_history::Column::RecordedAt)
            .all(&*self.db)
            .await?;

        // ascending order: later entries overwrite earlier ones per stage
        let mut recorded_at: HashMap<usize, DateTime<Utc>> = HashMap::new();
        let mut notes: HashMap<usize, String> = HashMap::new();
        for entry in &entries {
            recorded_at.insert(entry.stage.position(), entry.recorded_at);
            if !entry.note.is_empty() {
                notes.insert(entry.stage.position(), entry.note.clone());
            }
        }
        recorded_at
            .entry(DocumentStage::Opening.position())
            .or_insert(model.entered_at);

        let current = model.stage.position();
        Ok(STAGE_SEQUENCE
            .iter()
            .enumerate()
            .map(|(position, stage)| StageTimelineEntry {
                stage: stage.clone(),
                label: stage.label().to_string(),
                completed: position <= current,
                recorded_at: recorded_at.get(&position).copied(),
                note: notes.get(&position).cloned(),
            })
            .collect())
    }

    async fn require_document(&self, document_id: Uuid) -> Result<document::Model, ServiceError> {
        document::Entity::find_by_id(document_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Document {} not found", document_id))
            })
    }
}
