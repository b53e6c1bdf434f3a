//! Scoring formula for salaried applicants.

use rust_decimal::Decimal;

use crate::config::ScoringConfig;
use crate::models::{Applicant, ScoreCard};

use super::scoring::CardBuilder;

/// Scores a salaried applicant.
///
/// Fixed base points come first, then one contribution per dimension in
/// the order the annexure lists them. Professional-only fields are ignored.
/// The total is capped at the policy's maximum score.
pub fn score_salaried(applicant: &Applicant, config: &ScoringConfig) -> ScoreCard {
    let common = &config.common;
    let salaried = &config.salaried;
    let mut card = CardBuilder::default();

    for (dimension, points) in &salaried.base_points {
        card.fixed(dimension, "base", *points);
    }

    card.band(
        "work_experience",
        &salaried.work_experience,
        applicant.work_experience_years,
    );
    card.category("marital", &common.marital, applicant.marital_status);
    card.band("age", &common.age, Decimal::from(applicant.age));
    card.band(
        "dependents",
        &common.dependents,
        Decimal::from(applicant.dependents),
    );
    card.band(
        "bank_relationship",
        &common.bank_relationship,
        Decimal::from(applicant.bank_relationship_years),
    );
    card.category("residence", &common.residence, applicant.residence_type);
    card.band(
        "years_at_address",
        &common.years_at_address,
        Decimal::from(applicant.years_at_address),
    );
    card.band(
        "spouse_income",
        &salaried.spouse_income,
        applicant.spouse_income_annual,
    );
    card.band(
        "disposable_income",
        &common.disposable_income,
        applicant.disposable_monthly_income,
    );
    card.band(
        "emi_nmi_ratio",
        &common.emi_nmi_ratio,
        applicant.emi_nmi_ratio_percent.unwrap_or(Decimal::ZERO),
    );
    card.category(
        "repayment_channel",
        &salaried.repayment_channel,
        applicant.repayment_type,
    );
    card.band(
        "itr_years",
        &salaried.itr_years,
        Decimal::from(applicant.itr_years_filed),
    );
    card.bureau_dimensions(applicant, common);

    card.finish(config)
}
