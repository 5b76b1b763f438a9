//! Unit tests for lead scoring.

use crate::scoring::{LeadGrade, LeadProfile, MAX_SCORE, ScoreSignal, score_lead};
use rstest::rstest;

#[rstest]
fn empty_profile_is_cold_with_no_breakdown() {
    let score = score_lead(&LeadProfile::new());

    assert_eq!(score.total, 0);
    assert_eq!(score.grade, LeadGrade::Cold);
    assert!(score.breakdown.is_empty());
}

#[rstest]
fn complete_enterprise_referral_reaches_the_maximum() {
    let profile = LeadProfile::new()
        .with_email("ada@example.com")
        .with_phone("+44 20 7946 0000")
        .with_company("Analytical Engines")
        .with_job_title("Co-Founder & CEO")
        .with_company_size(5_000)
        .with_estimated_value(250_000)
        .with_source("Referral");

    let score = score_lead(&profile);

    assert_eq!(score.total, MAX_SCORE);
    assert_eq!(score.grade, LeadGrade::Hot);
    assert_eq!(score.breakdown.len(), 7);
}

#[rstest]
#[case("Chief Revenue Officer", 20)]
#[case("VP of Sales", 20)]
#[case("Vice President, Marketing", 20)]
#[case("Director of Engineering", 15)]
#[case("Head of Growth", 15)]
#[case("Engineering Manager", 10)]
#[case("Team Lead", 10)]
#[case("Account Executive", 5)]
#[case("MVP Developer", 5)]
#[case("   ", 0)]
fn job_titles_score_by_seniority(#[case] title: &str, #[case] points: u8) {
    let score = score_lead(&LeadProfile::new().with_job_title(title));

    assert_eq!(score.points_for(ScoreSignal::JobTitle), points);
}

#[rstest]
#[case(0, 0)]
#[case(1, 5)]
#[case(49, 5)]
#[case(50, 10)]
#[case(200, 15)]
#[case(999, 15)]
#[case(1_000, 20)]
fn company_size_buckets(#[case] employees: u32, #[case] points: u8) {
    let score = score_lead(&LeadProfile::new().with_company_size(employees));

    assert_eq!(score.points_for(ScoreSignal::CompanySize), points);
}

#[rstest]
#[case(0, 0)]
#[case(1, 5)]
#[case(10_000, 10)]
#[case(49_999, 10)]
#[case(50_000, 15)]
#[case(100_000, 20)]
fn estimated_value_buckets(#[case] value: u64, #[case] points: u8) {
    let score = score_lead(&LeadProfile::new().with_estimated_value(value));

    assert_eq!(score.points_for(ScoreSignal::EstimatedValue), points);
}

#[rstest]
#[case("referral", 15)]
#[case("Website", 10)]
#[case("inbound", 10)]
#[case("event", 8)]
#[case("partner", 8)]
#[case("cold call", 3)]
#[case("", 0)]
fn sources_score_by_channel(#[case] source: &str, #[case] points: u8) {
    let score = score_lead(&LeadProfile::new().with_source(source));

    assert_eq!(score.points_for(ScoreSignal::Source), points);
}

#[rstest]
#[case(69, LeadGrade::Warm)]
#[case(70, LeadGrade::Hot)]
#[case(40, LeadGrade::Warm)]
#[case(39, LeadGrade::Cold)]
fn grade_thresholds(#[case] total: u8, #[case] grade: LeadGrade) {
    assert_eq!(LeadGrade::for_total(total), grade);
}

#[rstest]
fn blank_contact_details_do_not_score() {
    let score = score_lead(
        &LeadProfile::new()
            .with_email(" ")
            .with_phone("")
            .with_company("Acme"),
    );

    assert_eq!(score.total, 5);
    assert_eq!(score.points_for(ScoreSignal::Email), 0);
    assert_eq!(score.points_for(ScoreSignal::Company), 5);
}

#[rstest]
fn warm_lead_example() {
    let profile = LeadProfile::new()
        .with_email("grace@example.com")
        .with_job_title("Engineering Manager")
        .with_company_size(120)
        .with_source("website");

    let score = score_lead(&profile);

    assert_eq!(score.total, 40);
    assert_eq!(score.grade, LeadGrade::Warm);
}
