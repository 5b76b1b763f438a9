//! In-memory integration tests for lead assignment.

use std::sync::Arc;

use crm_engine::assignment::{
    adapters::memory::{InMemoryAssignmentRuleRepository, InMemoryLeadWorkload},
    domain::{AssignmentFilters, AssignmentStrategy, LeadAttributes, LeadStatus, UserId},
    services::{CreateAssignmentRuleRequest, LeadAssignmentService},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestService =
    LeadAssignmentService<InMemoryAssignmentRuleRepository, InMemoryLeadWorkload, DefaultClock>;

struct Harness {
    workload: Arc<InMemoryLeadWorkload>,
    service: TestService,
}

#[fixture]
fn harness() -> Harness {
    let workload = Arc::new(InMemoryLeadWorkload::new());
    let service = LeadAssignmentService::new(
        Arc::new(InMemoryAssignmentRuleRepository::new()),
        Arc::clone(&workload),
        Arc::new(DefaultClock),
    );
    Harness { workload, service }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn round_robin_cycles_through_candidates_in_order(harness: Harness) -> eyre::Result<()> {
    let candidates = vec![UserId::new(), UserId::new(), UserId::new()];
    harness
        .service
        .create_rule(CreateAssignmentRuleRequest::new(
            "Inbound rotation",
            AssignmentStrategy::RoundRobin,
            candidates.clone(),
        ))
        .await?;

    let mut picked = Vec::new();
    for _ in 0..7 {
        picked.push(harness.service.assign_lead(&LeadAttributes::new()).await?);
    }

    let expected: Vec<Option<UserId>> = candidates
        .iter()
        .cycle()
        .take(7)
        .copied()
        .map(Some)
        .collect();
    eyre::ensure!(picked == expected, "unexpected rotation {picked:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn load_balance_prefers_the_least_loaded_candidate(harness: Harness) -> eyre::Result<()> {
    let busy = UserId::new();
    let idle = UserId::new();
    for status in [LeadStatus::New, LeadStatus::Contacted, LeadStatus::Qualified] {
        harness.workload.record_lead(busy, status)?;
    }
    harness.workload.record_lead(idle, LeadStatus::New)?;
    harness.workload.record_lead(idle, LeadStatus::Converted)?;
    harness.workload.record_lead(idle, LeadStatus::Lost)?;
    harness
        .service
        .create_rule(CreateAssignmentRuleRequest::new(
            "Balanced",
            AssignmentStrategy::LoadBalance,
            [busy, idle],
        ))
        .await?;

    let picked = harness.service.assign_lead(&LeadAttributes::new()).await?;

    eyre::ensure!(picked == Some(idle), "expected the idle user, got {picked:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn industry_filter_routes_only_matching_leads(harness: Harness) -> eyre::Result<()> {
    let specialist = UserId::new();
    harness
        .service
        .create_rule(
            CreateAssignmentRuleRequest::new(
                "Tech desk",
                AssignmentStrategy::RoundRobin,
                [specialist],
            )
            .with_filters(AssignmentFilters::new().with_industry("Technology")),
        )
        .await?;

    let tech = harness
        .service
        .assign_lead(&LeadAttributes::new().with_industry("Technology"))
        .await?;
    let finance = harness
        .service
        .assign_lead(&LeadAttributes::new().with_industry("Finance"))
        .await?;

    eyre::ensure!(tech == Some(specialist));
    eyre::ensure!(finance.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn no_active_rules_assigns_nobody(harness: Harness) -> eyre::Result<()> {
    let rule = harness
        .service
        .create_rule(CreateAssignmentRuleRequest::new(
            "Dormant",
            AssignmentStrategy::RoundRobin,
            [UserId::new()],
        ))
        .await?;
    harness.service.deactivate(rule.id()).await?;

    let picked = harness.service.assign_lead(&LeadAttributes::new()).await?;

    eyre::ensure!(picked.is_none());
    Ok(())
}
