//! Calculation logic for the loan decision engine.
//!
//! This module contains the EMI calculator, the salaried and professional
//! scoring formulas, rate resolution against the spread tables, loan sizing,
//! and the [`DecisionEngine`] that orchestrates them into a decision.

mod eligibility;
mod emi;
mod interest_rate;
mod loan_terms;
mod professional_score;
mod salaried_score;
mod scoring;

pub use eligibility::{DecisionEngine, GRADE_OUTCOME_RULE};
pub use emi::{calculate_emi, monthly_rate};
pub use interest_rate::RateResolver;
pub use loan_terms::{LoanTerms, gross_monthly_income, loan_terms};
pub use professional_score::{net_worth_ratio, score_professional};
pub use salaried_score::score_salaried;
pub use scoring::Scorer;
