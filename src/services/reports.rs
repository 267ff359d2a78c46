use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{EntityTrait, QueryOrder, QuerySelect};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        budget_unit,
        document::{self, DocumentStatus},
    },
    errors::ServiceError,
};

const RECENT_DOCUMENTS: u64 = 5;

/// Count and net total for one payment status
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct StatusTotals {
    pub count: u64,
    pub net_total: Decimal,
}

/// Administrative dashboard: totals per status plus the latest documents
#[derive(Debug, Serialize)]
pub struct DashboardReport {
    pub pending: StatusTotals,
    pub paid: StatusTotals,
    pub overdue: StatusTotals,
    pub recent_documents: Vec<document::Model>,
}

/// Net totals grouped by budget unit; documents without a unit are grouped
/// under `budget_unit_id: None`
#[derive(Debug, Serialize)]
pub struct BudgetUnitTotals {
    pub budget_unit_id: Option<Uuid>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub document_count: u64,
    pub net_total: Decimal,
}

/// Service producing administrative report data
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Counts and net totals per status, plus the most recent documents.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardReport, ServiceError> {
        let documents = document::Entity::find().all(&*self.db).await?;

        let mut pending = StatusTotals::default();
        let mut paid = StatusTotals::default();
        let mut overdue = StatusTotals::default();
        for doc in &documents {
            let bucket = match doc.status {
                DocumentStatus::Pending => &mut pending,
                DocumentStatus::Paid => &mut paid,
                DocumentStatus::Overdue => &mut overdue,
            };
            bucket.count += 1;
            bucket.net_total += doc.net_amount;
        }

        let recent_documents = document::Entity::find()
            .order_by_desc(document::Column::DocumentDate)
            .limit(RECENT_DOCUMENTS)
            .all(&*self.db)
            .await?;

        Ok(DashboardReport {
            pending,
            paid,
            overdue,
            recent_documents,
        })
    }

    /// Net totals per budget unit, ordered by unit name with uncategorized
    /// documents last.
    #[instrument(skip(self))]
    pub async fn totals_by_budget_unit(&self) -> Result<Vec<BudgetUnitTotals>, ServiceError> {
        let units = budget_unit::Entity::find()
            .order_by_asc(budget_unit::Column::Name)
            .all(&*self.db)
            .await?;
        let documents = document::Entity::find().all(&*self.db).await?;

        let mut buckets: HashMap<Option<Uuid>, (u64, Decimal)> = HashMap::new();
        for doc in &documents {
            let bucket = buckets.entry(doc.budget_unit_id).or_default();
            bucket.0 += 1;
            bucket.1 += doc.net_amount;
        }

        let mut totals: Vec<BudgetUnitTotals> = units
            .into_iter()
            .map(|unit| {
                let (document_count, net_total) =
                    buckets.remove(&Some(unit.id)).unwrap_or_default();
                BudgetUnitTotals {
                    budget_unit_id: Some(unit.id),
                    code: Some(unit.code),
                    name: Some(unit.name),
                    document_count,
                    net_total,
                }
            })
            .collect();

        if let Some((document_count, net_total)) = buckets.remove(&None) {
            totals.push(BudgetUnitTotals {
                budget_unit_id: None,
                code: None,
                name: None,
                document_count,
                net_total,
            });
        }

        Ok(totals)
    }
}
