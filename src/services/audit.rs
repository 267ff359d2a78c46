use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, PaginatorTrait, QueryOrder};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{db::DbPool, entities::activity_log, errors::ServiceError};

/// Capability used by the other services to record audit entries after a
/// state-changing operation. Implementations must not fail the calling
/// operation: the write already committed.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(
        &self,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
        action: &str,
        details: &str,
    );
}

/// Database-backed audit sink and activity log reader
#[derive(Clone)]
pub struct ActivityLogService {
    db: Arc<DbPool>,
}

impl ActivityLogService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Lists activity entries, most recent first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<activity_log::Model>, u64), ServiceError> {
        let paginator = activity_log::Entity::find()
            .order_by_desc(activity_log::Column::RecordedAt)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let entries = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((entries, total))
    }
}

#[async_trait]
impl AuditSink for ActivityLogService {
    async fn record(
        &self,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
        action: &str,
        details: &str,
    ) {
        let entry = activity_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            actor_id: Set(actor),
            action: Set(action.to_string()),
            details: Set(details.to_string()),
            client_ip: Set(client_ip.map(str::to_string)),
            recorded_at: Set(Utc::now()),
        };

        // an audit failure must not roll back the operation it describes
        if let Err(e) = entry.insert(&*self.db).await {
            error!("failed to record activity entry '{}': {}", action, e);
        }
    }
}
