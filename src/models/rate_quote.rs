//! Pricing models: CIBIL slabs, salary channels and rate quotes.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A CIBIL score bucket used as a rate-table key.
///
/// # Example
///
/// ```
/// use loan_engine::models::CibilSlab;
///
/// assert_eq!(CibilSlab::from_score(Some(781)), CibilSlab::From776);
/// assert_eq!(CibilSlab::from_score(None), CibilSlab::NoTrackRecord);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CibilSlab {
    /// 800 and above.
    #[serde(rename = "800")]
    From800,
    /// 776 to 799.
    #[serde(rename = "776")]
    From776,
    /// 750 to 775.
    #[serde(rename = "750")]
    From750,
    /// 700 to 749.
    #[serde(rename = "700")]
    From700,
    /// Below 700 or no score ("new to credit").
    #[serde(rename = "ntc")]
    NoTrackRecord,
}

impl CibilSlab {
    /// Buckets a score; an absent score is treated as zero.
    pub fn from_score(score: Option<u32>) -> Self {
        match score.unwrap_or(0) {
            s if s >= 800 => CibilSlab::From800,
            s if s >= 776 => CibilSlab::From776,
            s if s >= 750 => CibilSlab::From750,
            s if s >= 700 => CibilSlab::From700,
            _ => CibilSlab::NoTrackRecord,
        }
    }

    /// The slab's table key.
    pub fn as_str(&self) -> &'static str {
        match self {
            CibilSlab::From800 => "800",
            CibilSlab::From776 => "776",
            CibilSlab::From750 => "750",
            CibilSlab::From700 => "700",
            CibilSlab::NoTrackRecord => "ntc",
        }
    }
}

impl fmt::Display for CibilSlab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a salaried applicant's salary is credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryChannel {
    /// Salary account held with the bank.
    BankSalaryAccount,
    /// Salary credited elsewhere.
    Other,
}

impl SalaryChannel {
    /// Channel for the given salary-account flag.
    pub fn from_flag(salary_account_with_bank: bool) -> Self {
        if salary_account_with_bank {
            SalaryChannel::BankSalaryAccount
        } else {
            SalaryChannel::Other
        }
    }
}

/// Whether a spread came from the table or from its named default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadSource {
    /// Exact table match.
    Table,
    /// The table had no entry; the default spread was used.
    Fallback,
}

/// A priced interest rate with its derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuote {
    /// Reference rate supplied by the caller.
    pub base_rate: Decimal,
    /// Policy spread added to the base rate.
    pub spread: Decimal,
    /// Base rate plus spread.
    pub annual_rate_percent: Decimal,
    /// CIBIL slab used for the lookup.
    pub slab: CibilSlab,
    /// Table hit or fallback.
    pub source: SpreadSource,
}
