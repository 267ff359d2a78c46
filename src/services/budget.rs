use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    codes,
    db::DbPool,
    entities::{budget_line, budget_unit},
    errors::ServiceError,
    events::{Event, EventSender},
    services::audit::AuditSink,
};

/// Service for managing budget units (secretarias) and their budget lines
/// (recursos). Codes are generated from the names at registration time and
/// never change afterwards.
#[derive(Clone)]
pub struct BudgetService {
    db: Arc<DbPool>,
    event_sender: EventSender,
    audit: Arc<dyn AuditSink>,
}

impl BudgetService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            db,
            event_sender,
            audit,
        }
    }

    /// Registers a budget unit with a generated acronym code.
    #[instrument(skip(self), fields(name = %name))]
    pub async fn create_unit(
        &self,
        name: &str,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
    ) -> Result<budget_unit::Model, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "name: budget unit name must not be empty".to_string(),
            ));
        }

        let existing = budget_unit::Entity::find()
            .filter(budget_unit::Column::Name.eq(name))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "budget unit '{}' already exists",
                name
            )));
        }

        let taken: HashSet<String> = budget_unit::Entity::find()
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|unit| unit.code)
            .collect();
        let code = codes::with_collision_suffix(&codes::unit_acronym(name), &taken);

        let saved = budget_unit::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            code: Set(code),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!("Budget unit created: {} ({})", saved.name, saved.code);
        self.audit
            .record(
                actor,
                client_ip,
                "Budget unit created",
                &format!("Budget unit {} - {}", saved.code, saved.name),
            )
            .await;
        self.event_sender
            .send(Event::BudgetUnitCreated(saved.id))
            .await;

        Ok(saved)
    }

    /// Renames a budget unit; the generated code stays stable.
    #[instrument(skip(self), fields(unit_id = %id))]
    pub async fn rename_unit(
        &self,
        id: Uuid,
        name: &str,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
    ) -> Result<budget_unit::Model, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "name: budget unit name must not be empty".to_string(),
            ));
        }

        let unit = self.get_unit(id).await?;
        let active = budget_unit::ActiveModel {
            id: sea_orm::ActiveValue::Unchanged(unit.id),
            name: Set(name.to_string()),
            code: sea_orm::ActiveValue::Unchanged(unit.code),
            created_at: sea_orm::ActiveValue::Unchanged(unit.created_at),
        };
        let saved = active.update(&*self.db).await?;

        self.audit
            .record(
                actor,
                client_ip,
                "Budget unit updated",
                &format!("Budget unit {} renamed to {}", saved.code, saved.name),
            )
            .await;

        Ok(saved)
    }

    /// Deletes a budget unit; its lines are removed by the cascade and
    /// documents referencing it fall back to uncategorized.
    #[instrument(skip(self), fields(unit_id = %id))]
    pub async fn delete_unit(
        &self,
        id: Uuid,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
    ) -> Result<(), ServiceError> {
        let unit = self.get_unit(id).await?;

        budget_unit::Entity::delete_by_id(id).exec(&*self.db).await?;

        info!("Budget unit deleted: {}", id);
        self.audit
            .record(
                actor,
                client_ip,
                "Budget unit deleted",
                &format!(
                    "Budget unit {} - {} and its lines were removed",
                    unit.code, unit.name
                ),
            )
            .await;
        self.event_sender.send(Event::BudgetUnitDeleted(id)).await;

        Ok(())
    }

    pub async fn get_unit(&self, id: Uuid) -> Result<budget_unit::Model, ServiceError> {
        budget_unit::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Budget unit {} not found", id)))
    }

    /// Lists all units with their lines, ordered by unit name.
    #[instrument(skip(self))]
    pub async fn list_units(
        &self,
    ) -> Result<Vec<(budget_unit::Model, Vec<budget_line::Model>)>, ServiceError> {
        budget_unit::Entity::find()
            .find_with_related(budget_line::Entity)
            .order_by_asc(budget_unit::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::from)
    }

    /// Registers a budget line under a unit with a generated prefixed code.
    #[instrument(skip(self), fields(unit_id = %unit_id, name = %name))]
    pub async fn create_line(
        &self,
        unit_id: Uuid,
        name: &str,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
    ) -> Result<budget_line::Model, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "name: budget line name must not be empty".to_string(),
            ));
        }

        let unit = self.get_unit(unit_id).await?;

        let taken: HashSet<String> = budget_line::Entity::find()
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|line| line.code)
            .collect();
        let code = codes::with_collision_suffix(&codes::line_code(&unit.code, name), &taken);

        let saved = budget_line::ActiveModel {
            id: Set(Uuid::new_v4()),
            budget_unit_id: Set(unit_id),
            name: Set(name.to_string()),
            code: Set(code),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!("Budget line created: {} ({})", saved.name, saved.code);
        self.audit
            .record(
                actor,
                client_ip,
                "Budget line created",
                &format!(
                    "Budget line {} - {} (unit {})",
                    saved.code, saved.name, unit.code
                ),
            )
            .await;
        self.event_sender
            .send(Event::BudgetLineCreated(saved.id))
            .await;

        Ok(saved)
    }

    /// Renames a budget line; the generated code stays stable.
    #[instrument(skip(self), fields(line_id = %id))]
    pub async fn rename_line(
        &self,
        id: Uuid,
        name: &str,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
    ) -> Result<budget_line::Model, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "name: budget line name must not be empty".to_string(),
            ));
        }

        let line = self.get_line(id).await?;
        let active = budget_line::ActiveModel {
            id: sea_orm::ActiveValue::Unchanged(line.id),
            budget_unit_id: sea_orm::ActiveValue::Unchanged(line.budget_unit_id),
            name: Set(name.to_string()),
            code: sea_orm::ActiveValue::Unchanged(line.code),
            created_at: sea_orm::ActiveValue::Unchanged(line.created_at),
        };
        let saved = active.update(&*self.db).await?;

        self.audit
            .record(
                actor,
                client_ip,
                "Budget line updated",
                &format!("Budget line {} renamed to {}", saved.code, saved.name),
            )
            .await;

        Ok(saved)
    }

    /// Deletes a budget line; documents referencing it fall back to the unit.
    #[instrument(skip(self), fields(line_id = %id))]
    pub async fn delete_line(
        &self,
        id: Uuid,
        actor: Option<Uuid>,
        client_ip: Option<&str>,
    ) -> Result<(), ServiceError> {
        let line = self.get_line(id).await?;

        budget_line::Entity::delete_by_id(id).exec(&*self.db).await?;

        info!("Budget line deleted: {}", id);
        self.audit
            .record(
                actor,
                client_ip,
                "Budget line deleted",
                &format!("Budget line {} - {} was removed", line.code, line.name),
            )
            .await;
        self.event_sender.send(Event::BudgetLineDeleted(id)).await;

        Ok(())
    }

    pub async fn get_line(&self, id: Uuid) -> Result<budget_line::Model, ServiceError> {
        budget_line::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Budget line {} not found", id)))
    }
}
