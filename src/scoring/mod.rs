//! Rule-based lead scoring.
//!
//! A lead's score is the sum of fixed points per signal (contact details,
//! seniority, company size, deal value and source), clamped to `0..=100`,
//! and graded hot, warm or cold. Scoring is a pure function of the profile.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest possible score.
pub const MAX_SCORE: u8 = 100;

const HOT_THRESHOLD: u8 = 70;
const WARM_THRESHOLD: u8 = 40;

const EXECUTIVE_TITLES: &[&str] = &[
    "ceo",
    "cto",
    "cfo",
    "coo",
    "founder",
    "owner",
    "president",
    "vp",
    "chief",
];
const DIRECTOR_TITLES: &[&str] = &["director", "head"];
const MANAGER_TITLES: &[&str] = &["manager", "lead"];

/// Lead attributes read by the scorer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadProfile {
    email: Option<String>,
    phone: Option<String>,
    company: Option<String>,
    job_title: Option<String>,
    company_size: Option<u32>,
    estimated_value: Option<u64>,
    source: Option<String>,
}

impl LeadProfile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the company name.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Sets the job title.
    #[must_use]
    pub fn with_job_title(mut self, job_title: impl Into<String>) -> Self {
        self.job_title = Some(job_title.into());
        self
    }

    /// Sets the company head count.
    #[must_use]
    pub const fn with_company_size(mut self, employees: u32) -> Self {
        self.company_size = Some(employees);
        self
    }

    /// Sets the estimated deal value in whole currency units.
    #[must_use]
    pub const fn with_estimated_value(mut self, value: u64) -> Self {
        self.estimated_value = Some(value);
        self
    }

    /// Sets the acquisition source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Signal contributing to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSignal {
    /// An email address is known.
    Email,
    /// A phone number is known.
    Phone,
    /// A company is known.
    Company,
    /// Seniority inferred from the job title.
    JobTitle,
    /// Company head count.
    CompanySize,
    /// Estimated deal value.
    EstimatedValue,
    /// Acquisition source.
    Source,
}

/// Points awarded for one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    /// Contributing signal.
    pub signal: ScoreSignal,
    /// Points awarded.
    pub points: u8,
}

/// Temperature bucket of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadGrade {
    /// Score of 70 or more.
    Hot,
    /// Score of 40 to 69.
    Warm,
    /// Score below 40.
    Cold,
}

impl LeadGrade {
    /// Returns the grade for a total score.
    #[must_use]
    pub const fn for_total(total: u8) -> Self {
        if total >= HOT_THRESHOLD {
            Self::Hot
        } else if total >= WARM_THRESHOLD {
            Self::Warm
        } else {
            Self::Cold
        }
    }

    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Warm => "warm",
            Self::Cold => "cold",
        }
    }
}

impl fmt::Display for LeadGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score of one lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadScore {
    /// Clamped total.
    pub total: u8,
    /// Grade derived from the total.
    pub grade: LeadGrade,
    /// Signals that awarded points, in rubric order.
    pub breakdown: Vec<ScoreComponent>,
}

impl LeadScore {
    /// Returns the points awarded for `signal`, zero when it did not score.
    #[must_use]
    pub fn points_for(&self, signal: ScoreSignal) -> u8 {
        self.breakdown
            .iter()
            .find(|component| component.signal == signal)
            .map_or(0, |component| component.points)
    }
}

/// Scores a lead profile.
#[must_use]
pub fn score_lead(profile: &LeadProfile) -> LeadScore {
    let candidates = [
        (ScoreSignal::Email, presence_points(profile.email.as_deref(), 10)),
        (ScoreSignal::Phone, presence_points(profile.phone.as_deref(), 10)),
        (ScoreSignal::Company, presence_points(profile.company.as_deref(), 5)),
        (ScoreSignal::JobTitle, job_title_points(profile.job_title.as_deref())),
        (ScoreSignal::CompanySize, company_size_points(profile.company_size)),
        (
            ScoreSignal::EstimatedValue,
            estimated_value_points(profile.estimated_value),
        ),
        (ScoreSignal::Source, source_points(profile.source.as_deref())),
    ];

    let breakdown: Vec<ScoreComponent> = candidates
        .into_iter()
        .filter(|&(_, points)| points > 0)
        .map(|(signal, points)| ScoreComponent { signal, points })
        .collect();
    let total = breakdown
        .iter()
        .fold(0_u8, |sum, component| sum.saturating_add(component.points))
        .min(MAX_SCORE);

    LeadScore {
        total,
        grade: LeadGrade::for_total(total),
        breakdown,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

fn presence_points(value: Option<&str>, points: u8) -> u8 {
    if non_blank(value).is_some() { points } else { 0 }
}

fn job_title_points(job_title: Option<&str>) -> u8 {
    let Some(title) = non_blank(job_title) else {
        return 0;
    };
    let normalized = title.to_lowercase();
    let words: Vec<&str> = normalized
        .split(|character: char| !character.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();
    let has_any = |titles: &[&str]| words.iter().any(|word| titles.contains(word));

    if has_any(EXECUTIVE_TITLES) {
        20
    } else if has_any(DIRECTOR_TITLES) {
        15
    } else if has_any(MANAGER_TITLES) {
        10
    } else {
        5
    }
}

const fn company_size_points(company_size: Option<u32>) -> u8 {
    match company_size {
        Some(1000..) => 20,
        Some(200..=999) => 15,
        Some(50..=199) => 10,
        Some(1..=49) => 5,
        Some(0) | None => 0,
    }
}

const fn estimated_value_points(estimated_value: Option<u64>) -> u8 {
    match estimated_value {
        Some(100_000..) => 20,
        Some(50_000..=99_999) => 15,
        Some(10_000..=49_999) => 10,
        Some(1..=9_999) => 5,
        Some(0) | None => 0,
    }
}

fn source_points(source: Option<&str>) -> u8 {
    let Some(raw) = non_blank(source) else {
        return 0;
    };
    match raw.to_ascii_lowercase().as_str() {
        "referral" => 15,
        "website" | "inbound" => 10,
        "event" | "partner" => 8,
        _ => 3,
    }
}

#[cfg(test)]
mod tests;
