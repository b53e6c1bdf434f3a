//! Applicant model and its categorical attributes.
//!
//! An [`Applicant`] is built once per evaluation request (or per CSV row)
//! and never mutated afterwards. Which scoring formula and which income cap
//! apply is decided entirely by [`ApplicantType`].

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The applicant type discriminator.
///
/// Unknown values are kept rather than rejected at parse time so the
/// eligibility engine can decline them with a rule citation.
///
/// # Example
///
/// ```
/// use loan_engine::models::ApplicantType;
///
/// assert_eq!(ApplicantType::from("salaried".to_string()), ApplicantType::Salaried);
/// assert!(!ApplicantType::from("self_employed".to_string()).is_recognized());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApplicantType {
    /// Salaried employee.
    Salaried,
    /// Self-employed professional.
    Professional,
    /// Any other value supplied by the caller.
    Unrecognized(String),
}

impl ApplicantType {
    /// Returns the wire name of the type.
    pub fn as_str(&self) -> &str {
        match self {
            ApplicantType::Salaried => "salaried",
            ApplicantType::Professional => "professional",
            ApplicantType::Unrecognized(value) => value,
        }
    }

    /// Returns true for the two types the policy knows how to score.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, ApplicantType::Unrecognized(_))
    }
}

impl From<String> for ApplicantType {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "salaried" => ApplicantType::Salaried,
            "professional" => ApplicantType::Professional,
            _ => ApplicantType::Unrecognized(value),
        }
    }
}

impl From<ApplicantType> for String {
    fn from(value: ApplicantType) -> Self {
        match value {
            ApplicantType::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ApplicantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Employer category for salaried applicants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Category A employer.
    #[serde(alias = "a")]
    A,
    /// Category B employer.
    #[serde(alias = "b")]
    B,
    /// Category C employer.
    #[serde(alias = "c")]
    C,
}

/// Marital status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    /// Single.
    Single,
    /// Married.
    Married,
    /// Divorced.
    Divorced,
}

/// Type of residence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidenceType {
    /// Rented accommodation.
    Rented,
    /// Owned, outside a metro.
    OwnedNonMetro,
    /// Owned, in a metro.
    OwnedMetro,
    /// Kaccha (non-permanent) construction.
    Kaccha,
}

/// How EMIs will be collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentChannel {
    /// Any other arrangement.
    Others,
    /// Post-dated cheques.
    PostDatedCheques,
    /// NACH mandate on another bank.
    NachOtherBank,
    /// Standing instruction on an account with the bank.
    SiBom,
    /// Deducted at source by the employer.
    Checkoff,
}

/// Credit-history track record category, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditHistory {
    /// Clean record for the last 36 months.
    #[serde(rename = "best_36m")]
    Best36Months,
    /// No overdues in the last 12 months, some before.
    #[serde(rename = "no_overdues_12m_prior")]
    NoOverdues12MonthsPrior,
    /// Less than 6 months of history, no arrears.
    #[serde(rename = "less_6m_no_arrears")]
    Under6MonthsNoArrears,
    /// No bureau record found.
    #[serde(rename = "no_bureau_hit")]
    NoBureauHit,
    /// Overdues within the last 12 months.
    #[serde(rename = "overdues_12m")]
    Overdues12Months,
    /// Less than 6 months of history, with arrears.
    #[serde(rename = "less6m_with_arrears")]
    Under6MonthsWithArrears,
    /// Weak record including settlements.
    #[serde(rename = "weak_with_settlements")]
    WeakWithSettlements,
}

/// Income trend of a professional over recent years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeTrend {
    /// Rising income.
    Increasing,
    /// Flat income.
    Stable,
    /// Fluctuating income.
    Unstable,
    /// Falling income.
    Decreasing,
}

/// Document and verification checklist used by the compliance gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceFlags {
    /// PAN and Aadhaar verified.
    pub kyc_ok: bool,
    /// Payslips or ITRs verified.
    pub payslips_ok: bool,
    /// No fraud history.
    pub fraud_ok: bool,
    /// Bank relationship verified.
    pub bank_rel_ok: bool,
    /// Residential address verified.
    pub address_ok: bool,
}

impl ComplianceFlags {
    /// Returns each flag with its wire name, in checklist order.
    pub fn entries(&self) -> [(&'static str, bool); 5] {
        [
            ("kyc_ok", self.kyc_ok),
            ("payslips_ok", self.payslips_ok),
            ("fraud_ok", self.fraud_ok),
            ("bank_rel_ok", self.bank_rel_ok),
            ("address_ok", self.address_ok),
        ]
    }

    /// Names of the flags that are not yet satisfied.
    pub fn unmet(&self) -> Vec<&'static str> {
        self.entries()
            .into_iter()
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| name)
            .collect()
    }

    /// True when every flag is satisfied.
    pub fn all_clear(&self) -> bool {
        self.entries().iter().all(|(_, ok)| *ok)
    }
}

/// Pre-Sanction Visit Report (PSVR).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitReport {
    /// Officer who performed the visit.
    #[serde(rename = "visit_officer")]
    pub officer: Option<String>,
    /// Date of the visit.
    #[serde(rename = "visit_date")]
    pub date: Option<NaiveDate>,
    /// Income and address verified satisfactorily.
    #[serde(rename = "visit_verified")]
    pub verified: bool,
    /// Free-form remarks.
    #[serde(rename = "visit_remarks")]
    pub remarks: Option<String>,
}

/// A personal-loan applicant.
///
/// Optional fields left empty are scored with the policy's documented
/// defaults. Professional-only fields are ignored for salaried applicants
/// and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    /// Applicant's full name.
    pub name: String,
    /// Salaried or professional.
    pub applicant_type: ApplicantType,
    /// Age in completed years.
    pub age: u32,
    /// Gross monthly income (salaried).
    #[serde(default)]
    pub gross_monthly_income: Option<Decimal>,
    /// Average gross annual income (professional).
    #[serde(default)]
    pub gross_annual_income: Option<Decimal>,
    /// Bureau score, if pulled.
    #[serde(default)]
    pub cibil_score: Option<u32>,
    /// Salary is credited to an account with the bank.
    #[serde(default, rename = "salary_account_with_bom")]
    pub salary_account_with_bank: bool,
    /// Employer category (salaried).
    #[serde(default)]
    pub category: Option<Category>,
    /// Years of work or professional experience.
    #[serde(default)]
    pub work_experience_years: Decimal,
    /// Marital status.
    #[serde(default)]
    pub marital_status: Option<MaritalStatus>,
    /// Number of dependents.
    #[serde(default)]
    pub dependents: u32,
    /// Years of relationship with the bank.
    #[serde(default)]
    pub bank_relationship_years: u32,
    /// Type of residence.
    #[serde(default)]
    pub residence_type: Option<ResidenceType>,
    /// Years at the current address.
    #[serde(default)]
    pub years_at_address: u32,
    /// Spouse's annual income.
    #[serde(default)]
    pub spouse_income_annual: Decimal,
    /// Disposable monthly income after existing obligations.
    #[serde(default)]
    pub disposable_monthly_income: Decimal,
    /// Existing EMIs as a percentage of net monthly income.
    #[serde(default)]
    pub emi_nmi_ratio_percent: Option<Decimal>,
    /// Proposed repayment channel.
    #[serde(default)]
    pub repayment_type: Option<RepaymentChannel>,
    /// Number of income-tax returns filed.
    #[serde(default)]
    pub itr_years_filed: u32,
    /// Average balance as a percentage of the proposed EMI.
    #[serde(default)]
    pub avg_balance_to_emi_ratio_percent: Option<Decimal>,
    /// Credit-history track record.
    #[serde(default)]
    pub credit_history_score_choice: Option<CreditHistory>,
    /// Net worth (professional).
    #[serde(default)]
    pub net_worth: Option<Decimal>,
    /// Requested loan amount.
    #[serde(default)]
    pub proposed_loan_amount: Option<Decimal>,
    /// Annual business turnover (professional).
    #[serde(default)]
    pub business_turnover_annual: Option<Decimal>,
    /// Income trend (professional).
    #[serde(default)]
    pub income_trend: Option<IncomeTrend>,
    /// Compliance checklist flags.
    #[serde(flatten)]
    pub compliance: ComplianceFlags,
    /// Pre-sanction visit report.
    #[serde(flatten)]
    pub visit: VisitReport,
}

impl Applicant {
    /// Creates an applicant of the given type with every optional field empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use loan_engine::models::{Applicant, ApplicantType};
    ///
    /// let applicant = Applicant::new("Rahul Sharma", ApplicantType::Salaried, 34);
    /// assert!(applicant.is_salaried());
    /// assert_eq!(applicant.dependents, 0);
    /// ```
    pub fn new(name: impl Into<String>, applicant_type: ApplicantType, age: u32) -> Self {
        Self {
            name: name.into(),
            applicant_type,
            age,
            gross_monthly_income: None,
            gross_annual_income: None,
            cibil_score: None,
            salary_account_with_bank: false,
            category: None,
            work_experience_years: Decimal::ZERO,
            marital_status: None,
            dependents: 0,
            bank_relationship_years: 0,
            residence_type: None,
            years_at_address: 0,
            spouse_income_annual: Decimal::ZERO,
            disposable_monthly_income: Decimal::ZERO,
            emi_nmi_ratio_percent: None,
            repayment_type: None,
            itr_years_filed: 0,
            avg_balance_to_emi_ratio_percent: None,
            credit_history_score_choice: None,
            net_worth: None,
            proposed_loan_amount: None,
            business_turnover_annual: None,
            income_trend: None,
            compliance: ComplianceFlags::default(),
            visit: VisitReport::default(),
        }
    }

    /// Returns true if the applicant is salaried.
    pub fn is_salaried(&self) -> bool {
        self.applicant_type == ApplicantType::Salaried
    }

    /// Returns true if the applicant is a professional.
    pub fn is_professional(&self) -> bool {
        self.applicant_type == ApplicantType::Professional
    }

    /// Category A employer with salary credited to the bank.
    pub fn is_preferred_salaried(&self) -> bool {
        self.is_salaried() && self.category == Some(Category::A) && self.salary_account_with_bank
    }

    /// Requested amount, if a positive one was given.
    pub fn requested_amount(&self) -> Option<Decimal> {
        self.proposed_loan_amount.filter(|amount| *amount > Decimal::ZERO)
    }
}
