//! Scoring formula for self-employed professionals.

use rust_decimal::Decimal;

use crate::config::ScoringConfig;
use crate::models::{Applicant, ScoreCard};

use super::scoring::CardBuilder;

/// Net worth as a multiple of the requested amount.
///
/// Zero when either operand is absent or the requested amount is not positive.
/// Saturates when the quotient is too large to represent.
///
/// # Examples
///
/// ```
/// use loan_engine::calculation::net_worth_ratio;
/// use rust_decimal::Decimal;
///
/// let ratio = net_worth_ratio(Some(Decimal::new(600000, 0)), Some(Decimal::new(1000000, 0)));
/// assert_eq!(ratio, Decimal::new(6, 1));
/// assert_eq!(net_worth_ratio(None, Some(Decimal::new(1000000, 0))), Decimal::ZERO);
/// ```
pub fn net_worth_ratio(net_worth: Option<Decimal>, proposed: Option<Decimal>) -> Decimal {
    match (net_worth, proposed) {
        (Some(worth), Some(loan)) if loan > Decimal::ZERO => {
            worth.checked_div(loan).unwrap_or(if worth.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            })
        }
        _ => Decimal::ZERO,
    }
}

/// Scores a professional applicant.
///
/// Differs from the salaried formula in its base points, experience tiers,
/// scaled bank-relationship points and the net-worth, income-trend and
/// turnover dimensions. Salaried-only fields are ignored.
pub fn score_professional(applicant: &Applicant, config: &ScoringConfig) -> ScoreCard {
    let common = &config.common;
    let professional = &config.professional;
    let mut card = CardBuilder::default();

    for (dimension, points) in &professional.base_points {
        card.fixed(dimension, "base", *points);
    }

    card.band(
        "dependents",
        &common.dependents,
        Decimal::from(applicant.dependents),
    );
    card.band(
        "work_experience",
        &professional.work_experience,
        applicant.work_experience_years,
    );
    card.category("marital", &common.marital, applicant.marital_status);
    card.band("age", &common.age, Decimal::from(applicant.age));

    let relationship_years = Decimal::from(applicant.bank_relationship_years);
    card.fixed(
        "bank_relationship",
        relationship_years,
        common
            .bank_relationship
            .points(relationship_years)
            .saturating_mul(professional.bank_relationship_multiplier),
    );

    card.category("residence", &common.residence, applicant.residence_type);
    card.band(
        "years_at_address",
        &common.years_at_address,
        Decimal::from(applicant.years_at_address),
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
    card.band(
        "net_worth_ratio",
        &professional.net_worth_ratio,
        net_worth_ratio(applicant.net_worth, applicant.proposed_loan_amount),
    );
    card.category(
        "income_trend",
        &professional.income_trend,
        applicant.income_trend,
    );
    card.band(
        "business_turnover",
        &professional.business_turnover,
        applicant.business_turnover_annual.unwrap_or(Decimal::ZERO),
    );
    card.band(
        "itr_years",
        &professional.itr_years,
        Decimal::from(applicant.itr_years_filed),
    );
    card.bureau_dimensions(applicant, common);

    card.finish(config)
}
