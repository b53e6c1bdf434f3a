//! Policy configuration types.
//!
//! This module contains the strongly-typed policy tables that are
//! deserialized from the YAML files of a policy directory.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Category, CibilSlab, CreditHistory, IncomeTrend, MaritalStatus, RepaymentChannel,
    ResidenceType, SalaryChannel,
};

/// Metadata about the policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyMetadata {
    /// Internal policy code.
    pub code: String,
    /// Human-readable scheme name.
    pub name: String,
    /// Version or effective date of the policy.
    pub version: String,
    /// The circular the tables were taken from.
    pub source: String,
    /// Reference rate used when the caller does not supply one.
    pub default_base_rate: Decimal,
}

impl PolicyMetadata {
    /// The default reference rate may not be negative.
    pub fn validate(&self) -> EngineResult<()> {
        if self.default_base_rate < Decimal::ZERO {
            return Err(EngineError::InvalidPolicy {
                table: "policy.default_base_rate".to_string(),
                message: format!("base rate must not be negative (got {})", self.default_base_rate),
            });
        }
        Ok(())
    }
}

/// One band of a threshold table.
///
/// `below` is an exclusive upper bound, `up_to` an inclusive one. A band
/// with neither matches every value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    /// Exclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below: Option<Decimal>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_to: Option<Decimal>,
    /// Points awarded inside the band.
    pub points: Decimal,
}

impl Band {
    fn admits(&self, value: Decimal) -> bool {
        match (self.below, self.up_to) {
            (Some(bound), _) => value < bound,
            (None, Some(bound)) => value <= bound,
            (None, None) => true,
        }
    }

    fn bound(&self) -> Option<Decimal> {
        self.below.or(self.up_to)
    }
}

/// An ordered threshold table; the first band admitting a value wins.
///
/// # Example
///
/// ```
/// use loan_engine::config::{Band, BandTable};
/// use rust_decimal::Decimal;
///
/// let table = BandTable::new(vec![
///     Band { below: Some(Decimal::new(20, 0)), up_to: None, points: Decimal::ZERO },
///     Band { below: None, up_to: Some(Decimal::new(25, 0)), points: Decimal::new(10, 0) },
///     Band { below: None, up_to: None, points: Decimal::ZERO },
/// ]);
/// assert_eq!(table.points(Decimal::new(22, 0)), Decimal::new(10, 0));
/// assert_eq!(table.points(Decimal::new(26, 0)), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BandTable(Vec<Band>);

impl BandTable {
    /// Creates a table from its bands.
    pub fn new(bands: Vec<Band>) -> Self {
        Self(bands)
    }

    /// Points for a value; zero if no band admits it.
    pub fn points(&self, value: Decimal) -> Decimal {
        self.0
            .iter()
            .find(|band| band.admits(value))
            .map(|band| band.points)
            .unwrap_or(Decimal::ZERO)
    }

    /// Checks that bounds ascend and that only the last band is a catch-all.
    pub fn validate(&self, table: &str) -> EngineResult<()> {
        let invalid = |message: &str| EngineError::InvalidPolicy {
            table: table.to_string(),
            message: message.to_string(),
        };

        let (last, rest) = self.0.split_last().ok_or_else(|| invalid("table is empty"))?;
        if last.bound().is_some() {
            return Err(invalid("last band must have no bound"));
        }

        let mut previous: Option<Decimal> = None;
        for band in rest {
            if band.below.is_some() && band.up_to.is_some() {
                return Err(invalid("a band may set `below` or `up_to`, not both"));
            }
            let bound = band
                .bound()
                .ok_or_else(|| invalid("only the last band may omit its bound"))?;
            if previous.is_some_and(|p| bound < p) {
                return Err(invalid("band bounds must ascend"));
            }
            previous = Some(bound);
        }
        Ok(())
    }
}

/// A category-to-points table with an explicit default key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize + Eq + Hash",
    deserialize = "K: Deserialize<'de> + Eq + Hash"
))]
pub struct CategoryTable<K> {
    /// Key used when the applicant left the field empty.
    pub default: K,
    /// Points per category.
    pub points: HashMap<K, Decimal>,
}

impl<K: Copy + Eq + Hash> CategoryTable<K> {
    /// The key actually looked up for an optional value.
    pub fn resolve(&self, key: Option<K>) -> K {
        key.unwrap_or(self.default)
    }

    /// Points for an optional value; zero for an unlisted key.
    pub fn points(&self, key: Option<K>) -> Decimal {
        self.points
            .get(&self.resolve(key))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Checks that the default key is listed.
    pub fn validate(&self, table: &str) -> EngineResult<()> {
        if self.points.contains_key(&self.default) {
            Ok(())
        } else {
            Err(EngineError::InvalidPolicy {
                table: table.to_string(),
                message: "default key has no points entry".to_string(),
            })
        }
    }
}

/// Score thresholds for grades 1 to 4; anything lower is grade 5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeScale {
    /// Grade 1 strictly above this score.
    pub grade_1_above: Decimal,
    /// Grade 2 at or above this score.
    pub grade_2_at_least: Decimal,
    /// Grade 3 at or above this score.
    pub grade_3_at_least: Decimal,
    /// Grade 4 at or above this score.
    pub grade_4_at_least: Decimal,
}

impl GradeScale {
    /// Maps a score to a grade.
    pub fn grade(&self, score: Decimal) -> u8 {
        if score > self.grade_1_above {
            1
        } else if score >= self.grade_2_at_least {
            2
        } else if score >= self.grade_3_at_least {
            3
        } else if score >= self.grade_4_at_least {
            4
        } else {
            5
        }
    }
}

/// Dimensions scored identically for both applicant types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonScoring {
    /// Marital status.
    pub marital: CategoryTable<MaritalStatus>,
    /// Age in years.
    pub age: BandTable,
    /// Number of dependents.
    pub dependents: BandTable,
    /// Years of bank relationship.
    pub bank_relationship: BandTable,
    /// Residence type.
    pub residence: CategoryTable<ResidenceType>,
    /// Years at current address.
    pub years_at_address: BandTable,
    /// Disposable monthly income.
    pub disposable_income: BandTable,
    /// Existing EMI to net monthly income, percent.
    pub emi_nmi_ratio: BandTable,
    /// Average balance to EMI, percent.
    pub avg_balance_ratio: BandTable,
    /// Bureau score.
    pub cibil: BandTable,
    /// Credit-history category.
    pub credit_history: CategoryTable<CreditHistory>,
}

/// Dimensions specific to salaried applicants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalariedScoring {
    /// Fixed points awarded to every salaried applicant.
    pub base_points: BTreeMap<String, Decimal>,
    /// Years of work experience.
    pub work_experience: BandTable,
    /// Spouse's annual income.
    pub spouse_income: BandTable,
    /// Repayment channel.
    pub repayment_channel: CategoryTable<RepaymentChannel>,
    /// ITR years filed.
    pub itr_years: BandTable,
}

/// Dimensions specific to professional applicants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessionalScoring {
    /// Fixed points awarded to every professional.
    pub base_points: BTreeMap<String, Decimal>,
    /// Years of professional experience.
    pub work_experience: BandTable,
    /// Scale applied to the common bank-relationship points.
    pub bank_relationship_multiplier: Decimal,
    /// Net worth to proposed loan ratio.
    pub net_worth_ratio: BandTable,
    /// Income trend.
    pub income_trend: CategoryTable<IncomeTrend>,
    /// Annual business turnover.
    pub business_turnover: BandTable,
    /// ITR years filed.
    pub itr_years: BandTable,
}

/// Complete scoring policy from scoring.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Composite score cap.
    pub max_score: Decimal,
    /// Score to grade mapping.
    pub grades: GradeScale,
    /// Shared dimensions.
    pub common: CommonScoring,
    /// Salaried-only dimensions.
    pub salaried: SalariedScoring,
    /// Professional-only dimensions.
    pub professional: ProfessionalScoring,
}

impl ScoringConfig {
    /// Validates every table.
    pub fn validate(&self) -> EngineResult<()> {
        let c = &self.common;
        for (name, table) in [
            ("common.age", &c.age),
            ("common.dependents", &c.dependents),
            ("common.bank_relationship", &c.bank_relationship),
            ("common.years_at_address", &c.years_at_address),
            ("common.disposable_income", &c.disposable_income),
            ("common.emi_nmi_ratio", &c.emi_nmi_ratio),
            ("common.avg_balance_ratio", &c.avg_balance_ratio),
            ("common.cibil", &c.cibil),
            ("salaried.work_experience", &self.salaried.work_experience),
            ("salaried.spouse_income", &self.salaried.spouse_income),
            ("salaried.itr_years", &self.salaried.itr_years),
            ("professional.work_experience", &self.professional.work_experience),
            ("professional.net_worth_ratio", &self.professional.net_worth_ratio),
            ("professional.business_turnover", &self.professional.business_turnover),
            ("professional.itr_years", &self.professional.itr_years),
        ] {
            table.validate(name)?;
        }
        c.marital.validate("common.marital")?;
        c.residence.validate("common.residence")?;
        c.credit_history.validate("common.credit_history")?;
        self.salaried
            .repayment_channel
            .validate("salaried.repayment_channel")?;
        self.professional
            .income_trend
            .validate("professional.income_trend")?;
        Ok(())
    }
}

/// One entry of the sparse salaried spread table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalariedSpread {
    /// Employer category.
    pub category: Category,
    /// Salary channel.
    pub channel: SalaryChannel,
    /// CIBIL slab.
    pub slab: CibilSlab,
    /// Spread in percent.
    pub spread: Decimal,
}

/// Salaried spreads keyed by category, channel and slab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalariedSpreads {
    /// Spread for combinations not in the table.
    pub default_spread: Decimal,
    /// Listed combinations.
    pub spreads: Vec<SalariedSpread>,
}

impl SalariedSpreads {
    /// Exact-match lookup; `None` if the combination is not listed.
    pub fn lookup(
        &self,
        category: Category,
        channel: SalaryChannel,
        slab: CibilSlab,
    ) -> Option<Decimal> {
        self.spreads
            .iter()
            .find(|s| s.category == category && s.channel == channel && s.slab == slab)
            .map(|s| s.spread)
    }
}

/// Professional spreads keyed by slab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessionalSpreads {
    /// Spread for a slab not in the table.
    pub default_spread: Decimal,
    /// Spread per slab.
    pub spreads: HashMap<CibilSlab, Decimal>,
}

/// Rate spread tables from rates.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesConfig {
    /// Salaried table.
    pub salaried: SalariedSpreads,
    /// Professional table.
    pub professional: ProfessionalSpreads,
}

impl RatesConfig {
    /// Spreads may not be negative, or a priced rate could fall below base.
    pub fn validate(&self) -> EngineResult<()> {
        let negative = self.salaried.default_spread < Decimal::ZERO
            || self.professional.default_spread < Decimal::ZERO
            || self.salaried.spreads.iter().any(|s| s.spread < Decimal::ZERO)
            || self.professional.spreads.values().any(|s| *s < Decimal::ZERO);
        if negative {
            return Err(EngineError::InvalidPolicy {
                table: "rates".to_string(),
                message: "spreads must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Inclusive age band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBand {
    /// Minimum age.
    pub min: u32,
    /// Maximum age.
    pub max: u32,
}

impl AgeBand {
    /// True if the age lies inside the band.
    pub fn contains(&self, age: u32) -> bool {
        (self.min..=self.max).contains(&age)
    }
}

/// Repayment tenures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenureConfig {
    /// Tenure for category A with salary account at the bank.
    pub preferred_months: u32,
    /// Tenure for everyone else.
    pub standard_months: u32,
}

/// Deduction norms as a percentage of gross monthly income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionNorms {
    /// Salaried, category A.
    pub salaried_category_a: Decimal,
    /// Salaried, other categories.
    pub salaried_other: Decimal,
    /// Professionals.
    pub professional: Decimal,
}

/// Eligibility gates and loan sizing from eligibility.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityConfig {
    /// Minimum bureau score.
    pub cibil_cutoff: u32,
    /// Whether an absent bureau score passes the cut-off gate.
    pub allow_missing_cibil: bool,
    /// Permitted age band for salaried applicants.
    pub salaried_age: AgeBand,
    /// Absolute loan ceiling.
    pub max_loan_amount: Decimal,
    /// Multiple of gross monthly income for salaried applicants.
    pub salaried_income_multiple: Decimal,
    /// Multiple of gross annual income for professionals.
    pub professional_income_multiple: Decimal,
    /// Tenures.
    pub tenure: TenureConfig,
    /// EMI deduction limits.
    pub deduction_norm: DeductionNorms,
    /// Highest grade sanctionable under normal authority.
    pub max_sanction_grade: u8,
}

impl EligibilityConfig {
    /// Validates the age band, sizing and norms.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |table: &str, message: String| EngineError::InvalidPolicy {
            table: format!("eligibility.{table}"),
            message,
        };

        let age = self.salaried_age;
        if age.min > age.max {
            return Err(invalid(
                "salaried_age",
                format!("min {} is above max {}", age.min, age.max),
            ));
        }
        if self.tenure.preferred_months == 0 || self.tenure.standard_months == 0 {
            return Err(invalid("tenure", "tenures must be at least one month".to_string()));
        }
        for (name, multiple) in [
            ("max_loan_amount", self.max_loan_amount),
            ("salaried_income_multiple", self.salaried_income_multiple),
            ("professional_income_multiple", self.professional_income_multiple),
        ] {
            if multiple < Decimal::ZERO {
                return Err(invalid(name, format!("must not be negative (got {multiple})")));
            }
        }
        let norms = &self.deduction_norm;
        for (name, norm) in [
            ("salaried_category_a", norms.salaried_category_a),
            ("salaried_other", norms.salaried_other),
            ("professional", norms.professional),
        ] {
            if norm <= Decimal::ZERO {
                return Err(invalid(
                    &format!("deduction_norm.{name}"),
                    format!("must be positive (got {norm})"),
                ));
            }
        }
        if !(1..=5).contains(&self.max_sanction_grade) {
            return Err(invalid(
                "max_sanction_grade",
                format!("must be a grade from 1 to 5 (got {})", self.max_sanction_grade),
            ));
        }
        Ok(())
    }
}

/// The complete policy loaded from a policy directory.
///
/// Immutable once built; several versions may be held side by side.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    metadata: PolicyMetadata,
    scoring: ScoringConfig,
    rates: RatesConfig,
    eligibility: EligibilityConfig,
}

impl PolicyConfig {
    /// Creates a validated policy from its component parts.
    pub fn new(
        metadata: PolicyMetadata,
        scoring: ScoringConfig,
        rates: RatesConfig,
        eligibility: EligibilityConfig,
    ) -> EngineResult<Self> {
        metadata.validate()?;
        scoring.validate()?;
        rates.validate()?;
        eligibility.validate()?;
        Ok(Self {
            metadata,
            scoring,
            rates,
            eligibility,
        })
    }

    /// Returns the policy metadata.
    pub fn metadata(&self) -> &PolicyMetadata {
        &self.metadata
    }

    /// Returns the scoring tables.
    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Returns the rate spread tables.
    pub fn rates(&self) -> &RatesConfig {
        &self.rates
    }

    /// Returns the eligibility settings.
    pub fn eligibility(&self) -> &EligibilityConfig {
        &self.eligibility
    }
}
