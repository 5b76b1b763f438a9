//! Unit tests for assignment rule domain behaviour.

use crate::assignment::domain::{
    AssignmentDomainError, AssignmentFilters, AssignmentRule, AssignmentRuleId,
    AssignmentRuleName, AssignmentStrategy, LeadAttributes, LeadStatus,
    PersistedAssignmentRuleData, UserId,
};
use crate::test_support::ManualClock;
use eyre::ensure;
use mockable::Clock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> ManualClock {
    ManualClock::monday_morning()
}

fn rule_with(
    strategy: AssignmentStrategy,
    candidates: Vec<UserId>,
    filters: AssignmentFilters,
    clock: &ManualClock,
) -> Result<AssignmentRule, AssignmentDomainError> {
    Ok(AssignmentRule::new(
        AssignmentRuleName::new("Inbound leads")?,
        strategy,
        candidates,
        filters,
        clock,
    ))
}

#[rstest]
#[case("")]
#[case("   ")]
fn rule_name_rejects_blank_values(#[case] raw: &str) {
    assert_eq!(
        AssignmentRuleName::new(raw),
        Err(AssignmentDomainError::EmptyRuleName)
    );
}

#[rstest]
fn rule_name_is_trimmed() -> eyre::Result<()> {
    let name = AssignmentRuleName::new("  Enterprise  ")?;
    ensure!(name.as_str() == "Enterprise");
    Ok(())
}

#[rstest]
#[case("round_robin", AssignmentStrategy::RoundRobin)]
#[case("LOAD_BALANCE", AssignmentStrategy::LoadBalance)]
fn strategy_parses_storage_values(#[case] raw: &str, #[case] expected: AssignmentStrategy) {
    assert_eq!(AssignmentStrategy::try_from(raw), Ok(expected));
}

#[rstest]
fn strategy_rejects_unknown_value() {
    assert!(AssignmentStrategy::try_from("weighted").is_err());
}

#[rstest]
#[case(LeadStatus::New, true)]
#[case(LeadStatus::Contacted, true)]
#[case(LeadStatus::Qualified, true)]
#[case(LeadStatus::Unqualified, false)]
#[case(LeadStatus::Converted, false)]
#[case(LeadStatus::Lost, false)]
fn lead_status_open_flag(#[case] status: LeadStatus, #[case] expected: bool) {
    assert_eq!(status.is_open(), expected);
}

#[rstest]
fn industry_filter_matches_equal_value_only() {
    let filters = AssignmentFilters::new().with_industry("Technology");

    assert!(filters.matches(&LeadAttributes::new().with_industry("Technology")));
    assert!(!filters.matches(&LeadAttributes::new().with_industry("Finance")));
    assert!(!filters.matches(&LeadAttributes::new()));
}

#[rstest]
fn empty_filters_match_every_lead() {
    let filters = AssignmentFilters::new();

    assert!(filters.is_unconditional());
    assert!(filters.matches(&LeadAttributes::new()));
    assert!(filters.matches(&LeadAttributes::new().with_source("website")));
}

#[rstest]
fn every_configured_filter_must_match() {
    let filters = AssignmentFilters::new()
        .with_source("referral")
        .with_source_id("partner-7")
        .with_status(LeadStatus::New);
    let lead = LeadAttributes::new()
        .with_source("referral")
        .with_source_id("partner-7")
        .with_status(LeadStatus::New);

    assert!(filters.matches(&lead));
    assert!(!filters.matches(&lead.clone().with_status(LeadStatus::Contacted)));
    assert!(!filters.matches(&lead.with_source_id("partner-8")));
}

#[rstest]
fn inactive_rule_never_matches(clock: ManualClock) -> eyre::Result<()> {
    let mut rule = rule_with(
        AssignmentStrategy::RoundRobin,
        vec![UserId::new()],
        AssignmentFilters::new(),
        &clock,
    )?;
    rule.deactivate(&clock);

    ensure!(!rule.matches(&LeadAttributes::new()));
    Ok(())
}

#[rstest]
fn rotation_cycles_through_candidates_in_order(clock: ManualClock) -> eyre::Result<()> {
    let users = [UserId::new(), UserId::new(), UserId::new()];
    let mut rule = rule_with(
        AssignmentStrategy::RoundRobin,
        users.to_vec(),
        AssignmentFilters::new(),
        &clock,
    )?;
    ensure!(rule.last_assigned_index().is_none());

    let picks: Vec<(usize, UserId)> = (0..5)
        .filter_map(|_| rule.advance_rotation(clock.utc()))
        .collect();

    let expected_indices = [0_usize, 1, 2, 0, 1];
    ensure!(picks.len() == expected_indices.len());
    for ((index, user), expected) in picks.iter().zip(expected_indices) {
        ensure!(*index == expected);
        ensure!(Some(user) == users.get(expected));
    }
    ensure!(rule.last_assigned_index() == Some(1));
    Ok(())
}

#[rstest]
fn rotation_without_candidates_leaves_cursor_unset(clock: ManualClock) -> eyre::Result<()> {
    let mut rule = rule_with(
        AssignmentStrategy::RoundRobin,
        Vec::new(),
        AssignmentFilters::new(),
        &clock,
    )?;

    ensure!(rule.advance_rotation(clock.utc()).is_none());
    ensure!(rule.last_assigned_index().is_none());
    Ok(())
}

#[rstest]
fn shrinking_candidates_resets_out_of_range_cursor(clock: ManualClock) -> eyre::Result<()> {
    let mut rule = rule_with(
        AssignmentStrategy::RoundRobin,
        vec![UserId::new(), UserId::new(), UserId::new()],
        AssignmentFilters::new(),
        &clock,
    )?;
    rule.advance_rotation(clock.utc());
    rule.advance_rotation(clock.utc());
    rule.advance_rotation(clock.utc());
    ensure!(rule.last_assigned_index() == Some(2));

    rule.replace_candidates(vec![UserId::new()], &clock);

    ensure!(rule.last_assigned_index().is_none());
    Ok(())
}

#[rstest]
fn from_persisted_rejects_cursor_outside_candidates(clock: ManualClock) -> eyre::Result<()> {
    let rule_id = AssignmentRuleId::new();
    let data = PersistedAssignmentRuleData {
        id: rule_id,
        name: AssignmentRuleName::new("Broken")?,
        strategy: AssignmentStrategy::RoundRobin,
        candidates: vec![UserId::new()],
        filters: AssignmentFilters::new(),
        last_assigned_index: Some(4),
        is_active: true,
        created_at: clock.utc(),
        updated_at: clock.utc(),
    };

    let result = AssignmentRule::from_persisted(data);

    ensure!(
        result
            == Err(AssignmentDomainError::RotationCursorOutOfRange {
                rule_id,
                index: 4,
                candidates: 1,
            })
    );
    Ok(())
}

#[rstest]
fn filters_round_trip_through_json_without_unset_keys() -> eyre::Result<()> {
    let filters = AssignmentFilters::new().with_industry("Technology");

    let json = serde_json::to_value(&filters)?;

    ensure!(json == serde_json::json!({"industry": "Technology"}));
    ensure!(serde_json::from_value::<AssignmentFilters>(json)? == filters);
    Ok(())
}
