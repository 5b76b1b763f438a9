//! `PostgreSQL` execution log.

use super::{models::WorkflowExecutionRow, repository::WorkflowPgPool, schema::workflow_executions};
use crate::workflow::{
    domain::{
        EntityKind, ExecutionStatus, PersistedWorkflowExecutionData, TriggerEvent,
        WorkflowExecution, WorkflowExecutionId, WorkflowRuleId,
    },
    ports::{ExecutionLogError, ExecutionLogResult, WorkflowExecutionLog},
};
use async_trait::async_trait;
use diesel::prelude::*;

/// `PostgreSQL`-backed append-only execution log.
#[derive(Debug, Clone)]
pub struct PostgresExecutionLog {
    pool: WorkflowPgPool,
}

impl PostgresExecutionLog {
    /// Creates a new log from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: WorkflowPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowExecutionLog for PostgresExecutionLog {
    async fn record(&self, execution: &WorkflowExecution) -> ExecutionLogResult<()> {
        let pool = self.pool.clone();
        let row = execution_to_row(execution);

        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ExecutionLogError::persistence)?;
            diesel::insert_into(workflow_executions::table)
                .values(&row)
                .execute(&mut connection)
                .map_err(ExecutionLogError::persistence)?;
            Ok(())
        })
        .await
        .map_err(ExecutionLogError::persistence)?
    }

    async fn list_for_rule(
        &self,
        rule_id: WorkflowRuleId,
    ) -> ExecutionLogResult<Vec<WorkflowExecution>> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ExecutionLogError::persistence)?;
            let rows = workflow_executions::table
                .filter(workflow_executions::rule_id.eq(rule_id.into_inner()))
                .order((
                    workflow_executions::executed_at.asc(),
                    workflow_executions::id.asc(),
                ))
                .select(WorkflowExecutionRow::as_select())
                .load::<WorkflowExecutionRow>(&mut connection)
                .map_err(ExecutionLogError::persistence)?;
            rows.into_iter().map(row_to_execution).collect()
        })
        .await
        .map_err(ExecutionLogError::persistence)?
    }
}

fn execution_to_row(execution: &WorkflowExecution) -> WorkflowExecutionRow {
    WorkflowExecutionRow {
        id: execution.id().into_inner(),
        rule_id: execution.rule_id().into_inner(),
        entity_type: execution.entity().as_str().to_owned(),
        entity_id: execution.entity_id(),
        trigger_event: execution.event().as_str().to_owned(),
        status: execution.status().as_str().to_owned(),
        result: execution.result().clone(),
        executed_at: execution.executed_at(),
    }
}

fn row_to_execution(row: WorkflowExecutionRow) -> ExecutionLogResult<WorkflowExecution> {
    let WorkflowExecutionRow {
        id,
        rule_id,
        entity_type,
        entity_id,
        trigger_event,
        status,
        result,
        executed_at,
    } = row;

    let data = PersistedWorkflowExecutionData {
        id: WorkflowExecutionId::from_uuid(id),
        rule_id: WorkflowRuleId::from_uuid(rule_id),
        entity: EntityKind::try_from(entity_type.as_str())
            .map_err(ExecutionLogError::persistence)?,
        entity_id,
        event: TriggerEvent::try_from(trigger_event.as_str())
            .map_err(ExecutionLogError::persistence)?,
        status: ExecutionStatus::try_from(status.as_str())
            .map_err(ExecutionLogError::persistence)?,
        result,
        executed_at,
    };
    Ok(WorkflowExecution::from_persisted(data))
}
