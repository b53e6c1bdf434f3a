//! Loan sizing: income-based cap, tenure and deduction norm.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EligibilityConfig;
use crate::models::{Applicant, Category};

/// Sizing terms that depend only on the applicant and the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Income multiple before the absolute ceiling is applied.
    pub income_limit: Decimal,
    /// The lower of the income multiple and the absolute ceiling.
    pub eligibility_cap: Decimal,
    /// Repayment tenure in months.
    pub tenure_months: u32,
    /// Maximum EMI as a percentage of gross monthly income.
    pub deduction_limit_pct: Decimal,
}

/// Computes the sizing terms for an applicant.
///
/// Salaried applicants may borrow a multiple of gross monthly income,
/// professionals a multiple of gross annual income; both are capped at the
/// policy ceiling, so an income multiple too large to represent still
/// yields the ceiling. Only salaried category A applicants whose salary is
/// credited to the bank get the longer tenure.
///
/// # Examples
///
/// ```
/// use loan_engine::calculation::loan_terms;
/// use loan_engine::config::ConfigLoader;
/// use loan_engine::models::{Applicant, ApplicantType, Category};
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::builtin()?;
/// let mut applicant = Applicant::new("Asha", ApplicantType::Salaried, 34);
/// applicant.gross_monthly_income = Some(Decimal::new(60000, 0));
/// applicant.category = Some(Category::A);
/// applicant.salary_account_with_bank = true;
///
/// let terms = loan_terms(&applicant, loader.config().eligibility());
/// assert_eq!(terms.eligibility_cap, Decimal::new(1200000, 0));
/// assert_eq!(terms.tenure_months, 84);
/// assert_eq!(terms.deduction_limit_pct, Decimal::new(65, 0));
/// # Ok::<(), loan_engine::error::EngineError>(())
/// ```
pub fn loan_terms(applicant: &Applicant, eligibility: &EligibilityConfig) -> LoanTerms {
    let income_limit = if applicant.is_salaried() {
        eligibility
            .salaried_income_multiple
            .saturating_mul(applicant.gross_monthly_income.unwrap_or(Decimal::ZERO))
    } else {
        eligibility
            .professional_income_multiple
            .saturating_mul(applicant.gross_annual_income.unwrap_or(Decimal::ZERO))
    };
    let eligibility_cap = income_limit
        .min(eligibility.max_loan_amount)
        .max(Decimal::ZERO);

    let tenure_months = if applicant.is_preferred_salaried() {
        eligibility.tenure.preferred_months
    } else {
        eligibility.tenure.standard_months
    };

    let norms = &eligibility.deduction_norm;
    let deduction_limit_pct = if !applicant.is_salaried() {
        norms.professional
    } else if applicant.category == Some(Category::A) {
        norms.salaried_category_a
    } else {
        norms.salaried_other
    };

    LoanTerms {
        income_limit,
        eligibility_cap,
        tenure_months,
        deduction_limit_pct,
    }
}

/// Gross monthly income used for the deduction-norm check.
///
/// Salaried applicants use the monthly figure, professionals the annual
/// figure divided by twelve; each falls back to the other figure when its
/// own is absent. Zero when neither is given.
pub fn gross_monthly_income(applicant: &Applicant) -> Decimal {
    let monthly = applicant.gross_monthly_income;
    let from_annual = applicant
        .gross_annual_income
        .map(|annual| annual / Decimal::from(12));

    let preferred = if applicant.is_salaried() {
        monthly.or(from_annual)
    } else {
        from_annual.or(monthly)
    };
    preferred.unwrap_or(Decimal::ZERO)
}
