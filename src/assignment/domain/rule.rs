//! Assignment rule aggregate root.

use super::{
    AssignmentDomainError, AssignmentRuleId, AssignmentRuleName, LeadAttributes, LeadStatus,
    ParseAssignmentStrategyError, UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy used to pick a user once a rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    /// Cycle through candidates in list order.
    RoundRobin,
    /// Pick the candidate with the fewest open leads.
    LoadBalance,
}

impl AssignmentStrategy {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RoundRobin => "round_robin",
            Self::LoadBalance => "load_balance",
        }
    }
}

impl fmt::Display for AssignmentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AssignmentStrategy {
    type Error = ParseAssignmentStrategyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "round_robin" => Ok(Self::RoundRobin),
            "load_balance" => Ok(Self::LoadBalance),
            _ => Err(ParseAssignmentStrategyError(value.to_owned())),
        }
    }
}

/// Equality filters a lead must satisfy for a rule to apply.
///
/// Unset filters match every lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<LeadStatus>,
}

impl AssignmentFilters {
    /// Creates an empty, unconditional filter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the lead source to equal `source`.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Requires the lead source identifier to equal `source_id`.
    #[must_use]
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Requires the lead industry to equal `industry`.
    #[must_use]
    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    /// Requires the lead status to equal `status`.
    #[must_use]
    pub const fn with_status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns whether no filter is configured.
    #[must_use]
    pub const fn is_unconditional(&self) -> bool {
        self.source.is_none()
            && self.source_id.is_none()
            && self.industry.is_none()
            && self.status.is_none()
    }

    /// Returns whether every configured filter equals the lead attribute.
    #[must_use]
    pub fn matches(&self, lead: &LeadAttributes) -> bool {
        field_matches(self.source.as_deref(), lead.source())
            && field_matches(self.source_id.as_deref(), lead.source_id())
            && field_matches(self.industry.as_deref(), lead.industry())
            && self
                .status
                .is_none_or(|expected| lead.status() == Some(expected))
    }
}

fn field_matches(expected: Option<&str>, actual: Option<&str>) -> bool {
    expected.is_none_or(|value| actual == Some(value))
}

/// Assignment rule aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRule {
    id: AssignmentRuleId,
    name: AssignmentRuleName,
    strategy: AssignmentStrategy,
    candidates: Vec<UserId>,
    filters: AssignmentFilters,
    last_assigned_index: Option<usize>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted assignment rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAssignmentRuleData {
    /// Persisted rule identifier.
    pub id: AssignmentRuleId,
    /// Persisted rule name.
    pub name: AssignmentRuleName,
    /// Persisted strategy.
    pub strategy: AssignmentStrategy,
    /// Persisted ordered candidate list.
    pub candidates: Vec<UserId>,
    /// Persisted filters.
    pub filters: AssignmentFilters,
    /// Persisted rotation cursor; `None` before the first round-robin pick.
    pub last_assigned_index: Option<usize>,
    /// Persisted activation flag.
    pub is_active: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl AssignmentRule {
    /// Creates a new active rule with an unset rotation cursor.
    #[must_use]
    pub fn new(
        name: AssignmentRuleName,
        strategy: AssignmentStrategy,
        candidates: Vec<UserId>,
        filters: AssignmentFilters,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: AssignmentRuleId::new(),
            name,
            strategy,
            candidates,
            filters,
            last_assigned_index: None,
            is_active: true,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a rule from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::RotationCursorOutOfRange`] when the
    /// stored cursor does not index the stored candidate list.
    pub fn from_persisted(data: PersistedAssignmentRuleData) -> Result<Self, AssignmentDomainError> {
        if let Some(index) = data.last_assigned_index {
            if index >= data.candidates.len() {
                return Err(AssignmentDomainError::RotationCursorOutOfRange {
                    rule_id: data.id,
                    index,
                    candidates: data.candidates.len(),
                });
            }
        }

        Ok(Self {
            id: data.id,
            name: data.name,
            strategy: data.strategy,
            candidates: data.candidates,
            filters: data.filters,
            last_assigned_index: data.last_assigned_index,
            is_active: data.is_active,
            created_at: data.created_at,
            updated_at: data.updated_at,
        })
    }

    /// Returns the rule identifier.
    #[must_use]
    pub const fn id(&self) -> AssignmentRuleId {
        self.id
    }

    /// Returns the rule name.
    #[must_use]
    pub const fn name(&self) -> &AssignmentRuleName {
        &self.name
    }

    /// Returns the dispatch strategy.
    #[must_use]
    pub const fn strategy(&self) -> AssignmentStrategy {
        self.strategy
    }

    /// Returns the ordered candidate list.
    #[must_use]
    pub fn candidates(&self) -> &[UserId] {
        &self.candidates
    }

    /// Returns the configured filters.
    #[must_use]
    pub const fn filters(&self) -> &AssignmentFilters {
        &self.filters
    }

    /// Returns the rotation cursor.
    #[must_use]
    pub const fn last_assigned_index(&self) -> Option<usize> {
        self.last_assigned_index
    }

    /// Returns whether the rule takes part in assignment.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether this rule is active and its filters accept the lead.
    #[must_use]
    pub fn matches(&self, lead: &LeadAttributes) -> bool {
        self.is_active && self.filters.matches(lead)
    }

    /// Returns the index the next round-robin pick would use.
    ///
    /// Returns `None` when the candidate list is empty.
    #[must_use]
    pub fn next_rotation_index(&self) -> Option<usize> {
        let count = self.candidates.len();
        if count == 0 {
            return None;
        }
        let next = self.last_assigned_index.map_or(0, |index| index + 1);
        next.checked_rem(count)
    }

    /// Advances the rotation cursor and returns the picked candidate.
    ///
    /// Returns `None` without touching the cursor when the candidate list is
    /// empty.
    pub fn advance_rotation(&mut self, at: DateTime<Utc>) -> Option<(usize, UserId)> {
        let index = self.next_rotation_index()?;
        let user_id = *self.candidates.get(index)?;
        self.last_assigned_index = Some(index);
        self.updated_at = at;
        Some((index, user_id))
    }

    /// Replaces the candidate list.
    ///
    /// The rotation cursor is reset when it would no longer index the new
    /// list.
    pub fn replace_candidates(&mut self, candidates: Vec<UserId>, clock: &impl Clock) {
        if self
            .last_assigned_index
            .is_some_and(|index| index >= candidates.len())
        {
            self.last_assigned_index = None;
        }
        self.candidates = candidates;
        self.touch(clock);
    }

    /// Replaces the filters.
    pub fn replace_filters(&mut self, filters: AssignmentFilters, clock: &impl Clock) {
        self.filters = filters;
        self.touch(clock);
    }

    /// Marks the rule as active.
    pub fn activate(&mut self, clock: &impl Clock) {
        self.is_active = true;
        self.touch(clock);
    }

    /// Marks the rule as inactive.
    pub fn deactivate(&mut self, clock: &impl Clock) {
        self.is_active = false;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
