//! EMI (equated monthly instalment) calculation.
//!
//! This module provides the standard amortization formula used to price
//! every loan amount the engine considers.

use rust_decimal::{Decimal, MathematicalOps};

/// Converts an annual percentage rate to a monthly fractional rate.
///
/// # Examples
///
/// ```
/// use loan_engine::calculation::monthly_rate;
/// use rust_decimal::Decimal;
///
/// assert_eq!(monthly_rate(Decimal::new(12, 0)), Decimal::new(1, 2));
/// ```
pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / Decimal::from(1200)
}

/// Calculates the monthly instalment for an amortizing loan.
///
/// `EMI = P × r × (1 + r)^n / ((1 + r)^n − 1)` with `r` the monthly rate.
///
/// Returns zero when the principal is not positive or the term is zero, and
/// straight-line `P / n` when the monthly rate is zero. An instalment too
/// large to represent saturates at [`Decimal::MAX`].
///
/// # Examples
///
/// ```
/// use loan_engine::calculation::calculate_emi;
/// use rust_decimal::Decimal;
///
/// let emi = calculate_emi(Decimal::new(120000, 0), Decimal::ZERO, 12);
/// assert_eq!(emi, Decimal::new(10000, 0));
///
/// assert_eq!(calculate_emi(Decimal::ZERO, Decimal::new(12, 0), 12), Decimal::ZERO);
/// assert_eq!(calculate_emi(Decimal::MAX, Decimal::MAX, 12), Decimal::MAX);
/// ```
pub fn calculate_emi(principal: Decimal, annual_rate_percent: Decimal, months: u32) -> Decimal {
    if principal <= Decimal::ZERO || months == 0 {
        return Decimal::ZERO;
    }

    let term = Decimal::from(months);
    let r = monthly_rate(annual_rate_percent);
    if r.is_zero() {
        return principal / term;
    }

    amortize(principal, r, months).unwrap_or(Decimal::MAX)
}

/// The amortization formula; `None` when an intermediate overflows.
fn amortize(principal: Decimal, r: Decimal, months: u32) -> Option<Decimal> {
    // Growth so large it cannot be represented: the instalment tends to P × r.
    let Some(factor) = (Decimal::ONE + r).checked_powu(u64::from(months)) else {
        return principal.checked_mul(r);
    };

    let denominator = factor.checked_sub(Decimal::ONE)?;
    if denominator.is_zero() {
        return Some(principal / Decimal::from(months));
    }

    principal
        .checked_mul(r)?
        .checked_mul(factor.checked_div(denominator)?)
}
