//! Engine configuration.
//!
//! Every setting has a default, so an empty environment yields a working
//! configuration. [`EngineConfig::from_env`] overrides the defaults from
//! `CRM_*` environment variables.

use crate::sequence::domain::SchedulePolicy;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use thiserror::Error;

/// Environment variable selecting the step schedule policy.
pub const SCHEDULE_POLICY_VAR: &str = "CRM_SCHEDULE_POLICY";
/// Environment variable bounding the enrollments handled per sweep.
pub const SWEEP_BATCH_LIMIT_VAR: &str = "CRM_SWEEP_BATCH_LIMIT";
/// Environment variable setting the workflow rule cache TTL in seconds.
pub const RULE_CACHE_TTL_VAR: &str = "CRM_RULE_CACHE_TTL_SECS";
/// Environment variable setting the workflow rule cache capacity.
pub const RULE_CACHE_CAPACITY_VAR: &str = "CRM_RULE_CACHE_CAPACITY";

const DEFAULT_BATCH_LIMIT: usize = 100;
const DEFAULT_RULE_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_RULE_CACHE_CAPACITY: usize = 256;

/// Errors returned while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
}

/// Settings for the sequence step sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// How the next step's due time is computed.
    pub schedule_policy: SchedulePolicy,
    /// Maximum number of enrollments processed by one sweep.
    pub batch_limit: NonZeroUsize,
}

impl SequenceConfig {
    /// Returns settings with an anchored schedule and the default batch
    /// limit.
    #[must_use]
    pub fn anchored() -> Self {
        Self {
            schedule_policy: SchedulePolicy::Anchored,
            ..Self::default()
        }
    }

    /// Returns a copy with a different batch limit.
    #[must_use]
    pub const fn with_batch_limit(mut self, batch_limit: NonZeroUsize) -> Self {
        self.batch_limit = batch_limit;
        self
    }
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            schedule_policy: SchedulePolicy::FromNow,
            batch_limit: NonZeroUsize::new(DEFAULT_BATCH_LIMIT).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

/// Settings for workflow rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Lifetime of cached active-rule lookups, in seconds.
    pub rule_cache_ttl_secs: u64,
    /// Maximum number of `(entity, event)` lookups kept in the cache.
    pub rule_cache_capacity: NonZeroUsize,
}

impl WorkflowConfig {
    /// Returns the cache TTL as a duration, saturating at the largest
    /// representable value.
    #[must_use]
    pub fn rule_cache_ttl(&self) -> TimeDelta {
        i64::try_from(self.rule_cache_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            rule_cache_ttl_secs: DEFAULT_RULE_CACHE_TTL_SECS,
            rule_cache_capacity: NonZeroUsize::new(DEFAULT_RULE_CACHE_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sequence sweep settings.
    pub sequence: SequenceConfig,
    /// Workflow evaluation settings.
    pub workflow: WorkflowConfig,
}

impl EngineConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is set to a value
    /// that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults for
    /// unset or blank keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let read = |key: &'static str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let schedule_policy = read(SCHEDULE_POLICY_VAR)
            .map(|raw| {
                SchedulePolicy::try_from(raw.as_str()).map_err(|err| ConfigError::InvalidValue {
                    key: SCHEDULE_POLICY_VAR,
                    reason: err.to_string(),
                    value: raw,
                })
            })
            .transpose()?
            .unwrap_or(defaults.sequence.schedule_policy);
        let batch_limit = read(SWEEP_BATCH_LIMIT_VAR)
            .map(|raw| parse_value::<NonZeroUsize>(SWEEP_BATCH_LIMIT_VAR, raw))
            .transpose()?
            .unwrap_or(defaults.sequence.batch_limit);
        let rule_cache_ttl_secs = read(RULE_CACHE_TTL_VAR)
            .map(|raw| parse_value::<u64>(RULE_CACHE_TTL_VAR, raw))
            .transpose()?
            .unwrap_or(defaults.workflow.rule_cache_ttl_secs);
        let rule_cache_capacity = read(RULE_CACHE_CAPACITY_VAR)
            .map(|raw| parse_value::<NonZeroUsize>(RULE_CACHE_CAPACITY_VAR, raw))
            .transpose()?
            .unwrap_or(defaults.workflow.rule_cache_capacity);

        Ok(Self {
            sequence: SequenceConfig {
                schedule_policy,
                batch_limit,
            },
            workflow: WorkflowConfig {
                rule_cache_ttl_secs,
                rule_cache_capacity,
            },
        })
    }
}

fn parse_value<T>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|err| ConfigError::InvalidValue {
        key,
        reason: err.to_string(),
        value: raw,
    })
}
