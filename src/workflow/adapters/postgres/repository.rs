//! `PostgreSQL` repository implementation for workflow rules.

use super::{
    models::{NewWorkflowRuleRow, WorkflowRuleRow},
    schema::workflow_rules,
};
use crate::workflow::{
    domain::{
        Condition, EntityKind, PersistedWorkflowRuleData, Trigger, TriggerEvent, WorkflowRule,
        WorkflowRuleId, WorkflowRuleName,
    },
    ports::{WorkflowRuleRepository, WorkflowRuleRepositoryError, WorkflowRuleRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::Value;

/// `PostgreSQL` connection pool type used by workflow adapters.
pub type WorkflowPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed workflow rule repository.
#[derive(Debug, Clone)]
pub struct PostgresWorkflowRuleRepository {
    pool: WorkflowPgPool,
}

impl PostgresWorkflowRuleRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: WorkflowPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> WorkflowRuleRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> WorkflowRuleRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(WorkflowRuleRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(WorkflowRuleRepositoryError::persistence)?
    }
}

#[async_trait]
impl WorkflowRuleRepository for PostgresWorkflowRuleRepository {
    async fn store(&self, rule: &WorkflowRule) -> WorkflowRuleRepositoryResult<()> {
        let rule_id = rule.id();
        let new_row = rule_to_row(rule)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(workflow_rules::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        WorkflowRuleRepositoryError::DuplicateRule(rule_id)
                    }
                    _ => WorkflowRuleRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, rule: &WorkflowRule) -> WorkflowRuleRepositoryResult<()> {
        let rule_id = rule.id();
        let row = rule_to_row(rule)?;

        self.run_blocking(move |connection| {
            let updated_count = diesel::update(
                workflow_rules::table.filter(workflow_rules::id.eq(rule_id.into_inner())),
            )
            .set(&row)
            .execute(connection)
            .map_err(WorkflowRuleRepositoryError::persistence)?;
            if updated_count == 0 {
                return Err(WorkflowRuleRepositoryError::NotFound(rule_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: WorkflowRuleId) -> WorkflowRuleRepositoryResult<WorkflowRule> {
        self.run_blocking(move |connection| {
            let row = diesel::delete(
                workflow_rules::table.filter(workflow_rules::id.eq(id.into_inner())),
            )
            .returning(WorkflowRuleRow::as_returning())
            .get_result::<WorkflowRuleRow>(connection)
            .optional()
            .map_err(WorkflowRuleRepositoryError::persistence)?
            .ok_or(WorkflowRuleRepositoryError::NotFound(id))?;
            row_to_rule(row)
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: WorkflowRuleId,
    ) -> WorkflowRuleRepositoryResult<Option<WorkflowRule>> {
        self.run_blocking(move |connection| {
            let row = workflow_rules::table
                .filter(workflow_rules::id.eq(id.into_inner()))
                .select(WorkflowRuleRow::as_select())
                .first::<WorkflowRuleRow>(connection)
                .optional()
                .map_err(WorkflowRuleRepositoryError::persistence)?;
            row.map(row_to_rule).transpose()
        })
        .await
    }

    async fn list_all(&self) -> WorkflowRuleRepositoryResult<Vec<WorkflowRule>> {
        self.run_blocking(move |connection| {
            let rows = workflow_rules::table
                .order((workflow_rules::created_at.asc(), workflow_rules::id.asc()))
                .select(WorkflowRuleRow::as_select())
                .load::<WorkflowRuleRow>(connection)
                .map_err(WorkflowRuleRepositoryError::persistence)?;
            rows.into_iter().map(row_to_rule).collect()
        })
        .await
    }

    async fn list_active_for(
        &self,
        trigger: Trigger,
    ) -> WorkflowRuleRepositoryResult<Vec<WorkflowRule>> {
        self.run_blocking(move |connection| {
            let rows = workflow_rules::table
                .filter(workflow_rules::is_active.eq(true))
                .filter(workflow_rules::trigger_entity.eq(trigger.entity.as_str()))
                .filter(workflow_rules::trigger_event.eq(trigger.event.as_str()))
                .order((workflow_rules::created_at.asc(), workflow_rules::id.asc()))
                .select(WorkflowRuleRow::as_select())
                .load::<WorkflowRuleRow>(connection)
                .map_err(WorkflowRuleRepositoryError::persistence)?;
            rows.into_iter().map(row_to_rule).collect()
        })
        .await
    }
}

fn rule_to_row(rule: &WorkflowRule) -> WorkflowRuleRepositoryResult<NewWorkflowRuleRow> {
    let trigger = rule.trigger();
    Ok(NewWorkflowRuleRow {
        id: rule.id().into_inner(),
        name: rule.name().as_str().to_owned(),
        trigger_entity: trigger.entity.as_str().to_owned(),
        trigger_event: trigger.event.as_str().to_owned(),
        condition: rule
            .condition()
            .map(serde_json::to_value)
            .transpose()
            .map_err(WorkflowRuleRepositoryError::persistence)?,
        actions: serde_json::to_value(rule.actions())
            .map_err(WorkflowRuleRepositoryError::persistence)?,
        is_active: rule.is_active(),
        created_at: rule.created_at(),
        updated_at: rule.updated_at(),
    })
}

fn row_to_rule(row: WorkflowRuleRow) -> WorkflowRuleRepositoryResult<WorkflowRule> {
    let WorkflowRuleRow {
        id,
        name,
        trigger_entity,
        trigger_event,
        condition,
        actions,
        is_active,
        created_at,
        updated_at,
    } = row;

    let entity = EntityKind::try_from(trigger_entity.as_str())
        .map_err(WorkflowRuleRepositoryError::persistence)?;
    let event = TriggerEvent::try_from(trigger_event.as_str())
        .map_err(WorkflowRuleRepositoryError::persistence)?;
    let data = PersistedWorkflowRuleData {
        id: WorkflowRuleId::from_uuid(id),
        name: WorkflowRuleName::new(name).map_err(WorkflowRuleRepositoryError::persistence)?,
        trigger: Trigger::new(entity, event),
        condition: condition
            .map(serde_json::from_value::<Condition>)
            .transpose()
            .map_err(WorkflowRuleRepositoryError::persistence)?,
        actions: serde_json::from_value::<Vec<Value>>(actions)
            .map_err(WorkflowRuleRepositoryError::persistence)?,
        is_active,
        created_at,
        updated_at,
    };
    Ok(WorkflowRule::from_persisted(data))
}
