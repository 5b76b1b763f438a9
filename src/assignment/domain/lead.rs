//! Lead attributes consulted by assignment rules.

use super::ParseLeadStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline status of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Lead has just been captured.
    New,
    /// First contact has been made.
    Contacted,
    /// Lead has been qualified by sales.
    Qualified,
    /// Lead was judged not to be a fit.
    Unqualified,
    /// Lead was converted into an opportunity.
    Converted,
    /// Lead was lost.
    Lost,
}

impl LeadStatus {
    /// Statuses that count towards a user's open workload.
    pub const OPEN: [Self; 3] = [Self::New, Self::Contacted, Self::Qualified];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Unqualified => "unqualified",
            Self::Converted => "converted",
            Self::Lost => "lost",
        }
    }

    /// Returns whether the lead still occupies its owner.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::New | Self::Contacted | Self::Qualified)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for LeadStatus {
    type Error = ParseLeadStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "qualified" => Ok(Self::Qualified),
            "unqualified" => Ok(Self::Unqualified),
            "converted" => Ok(Self::Converted),
            "lost" => Ok(Self::Lost),
            _ => Err(ParseLeadStatusError(value.to_owned())),
        }
    }
}

/// Attributes of an incoming lead that assignment filters can inspect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadAttributes {
    source: Option<String>,
    source_id: Option<String>,
    industry: Option<String>,
    status: Option<LeadStatus>,
}

impl LeadAttributes {
    /// Creates an attribute set with no values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the lead source (for example `website` or `referral`).
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the identifier of the lead source record.
    #[must_use]
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Sets the lead industry.
    #[must_use]
    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    /// Sets the lead status.
    #[must_use]
    pub const fn with_status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns the lead source.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Returns the lead source identifier.
    #[must_use]
    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    /// Returns the lead industry.
    #[must_use]
    pub fn industry(&self) -> Option<&str> {
        self.industry.as_deref()
    }

    /// Returns the lead status.
    #[must_use]
    pub const fn status(&self) -> Option<LeadStatus> {
        self.status
    }
}
