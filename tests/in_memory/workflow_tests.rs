//! In-memory integration tests for workflow rule evaluation.

use std::sync::Arc;

use crm_engine::workflow::{
    adapters::memory::{InMemoryExecutionLog, InMemoryWorkflowRuleRepository},
    domain::{EntityEvent, EntityKind, EvaluationMode, ExecutionStatus, Trigger, TriggerEvent},
    services::{ConditionSpec, CreateWorkflowRuleRequest, WorkflowService},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Map, Value, json};
use uuid::Uuid;

const STATUS_CHANGED: Trigger = Trigger::new(EntityKind::Lead, TriggerEvent::StatusChanged);

type TestService =
    WorkflowService<InMemoryWorkflowRuleRepository, InMemoryExecutionLog, DefaultClock>;

#[fixture]
fn service() -> TestService {
    WorkflowService::new(
        Arc::new(InMemoryWorkflowRuleRepository::new()),
        Arc::new(InMemoryExecutionLog::new()),
        Arc::new(DefaultClock),
    )
}

fn status_event(status: &str) -> EntityEvent {
    let mut data = Map::new();
    data.insert("status".to_owned(), Value::from(status));
    data.insert("score".to_owned(), Value::from("72"));
    EntityEvent::new(STATUS_CHANGED, Uuid::new_v4(), data)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn qualified_leads_fire_the_handoff_rule(service: TestService) -> eyre::Result<()> {
    let handoff = service
        .create_rule(
            CreateWorkflowRuleRequest::new("Hand off qualified leads", STATUS_CHANGED)
                .with_condition(ConditionSpec::new("status", "in", json!(["qualified", "converted"])))
                .with_actions([json!({ "type": "assign", "team": "account_executives" })]),
        )
        .await?;
    let scored = service
        .create_rule(
            CreateWorkflowRuleRequest::new("Warm score", STATUS_CHANGED)
                .with_condition(ConditionSpec::new("score", ">", json!(70))),
        )
        .await?;

    let preview = service
        .evaluate_rules(&status_event("qualified"), EvaluationMode::DryRun)
        .await?;
    eyre::ensure!(preview.iter().all(|result| result.matched));
    eyre::ensure!(service.list_executions(handoff.id()).await?.is_empty());

    let live = service
        .evaluate_rules(&status_event("contacted"), EvaluationMode::Live)
        .await?;
    eyre::ensure!(live.len() == 2);

    let handoff_log = service.list_executions(handoff.id()).await?;
    let scored_log = service.list_executions(scored.id()).await?;
    eyre::ensure!(
        handoff_log
            .iter()
            .map(|execution| execution.status())
            .eq([ExecutionStatus::Skipped]),
        "unexpected handoff log {handoff_log:?}"
    );
    eyre::ensure!(
        scored_log
            .iter()
            .map(|execution| execution.status())
            .eq([ExecutionStatus::Success]),
        "unexpected score log {scored_log:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_triggers_are_ignored(service: TestService) -> eyre::Result<()> {
    service
        .create_rule(CreateWorkflowRuleRequest::new(
            "New contact welcome",
            Trigger::new(EntityKind::Contact, TriggerEvent::Created),
        ))
        .await?;

    let results = service
        .evaluate_rules(&status_event("qualified"), EvaluationMode::Live)
        .await?;

    eyre::ensure!(results.is_empty());
    Ok(())
}
