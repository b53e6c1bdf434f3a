//! One row of the bulk-import CSV.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{Applicant, ApplicantType, ComplianceFlags, VisitReport};

/// A raw CSV row; every cell is kept as text until conversion.
///
/// Columns missing from the header are treated as empty, so files without
/// the compliance columns import cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ApplicantRecord {
    pub name: Option<String>,
    pub applicant_type: Option<String>,
    pub age: Option<String>,
    pub gross_monthly_income: Option<String>,
    pub gross_annual_income: Option<String>,
    pub cibil_score: Option<String>,
    pub salary_account_with_bom: Option<String>,
    pub category: Option<String>,
    pub work_experience_years: Option<String>,
    pub marital_status: Option<String>,
    pub dependents: Option<String>,
    pub bank_relationship_years: Option<String>,
    pub residence_type: Option<String>,
    pub years_at_address: Option<String>,
    pub spouse_income_annual: Option<String>,
    pub disposable_monthly_income: Option<String>,
    pub emi_nmi_ratio_percent: Option<String>,
    pub repayment_type: Option<String>,
    pub itr_years_filed: Option<String>,
    pub avg_balance_to_emi_ratio_percent: Option<String>,
    pub credit_history_score_choice: Option<String>,
    pub net_worth: Option<String>,
    pub proposed_loan_amount: Option<String>,
    pub business_turnover_annual: Option<String>,
    pub income_trend: Option<String>,
    pub kyc_ok: Option<String>,
    pub payslips_ok: Option<String>,
    pub fraud_ok: Option<String>,
    pub bank_rel_ok: Option<String>,
    pub address_ok: Option<String>,
    pub visit_officer: Option<String>,
    pub visit_date: Option<String>,
    pub visit_verified: Option<String>,
    pub visit_remarks: Option<String>,
}

impl ApplicantRecord {
    /// Converts the row into an applicant.
    ///
    /// `row` is the one-based data row number, used for the default name and
    /// in error messages. Empty cells take the applicant's documented
    /// defaults; `age` is the only required column.
    pub fn into_applicant(self, row: usize) -> EngineResult<Applicant> {
        self.convert(row).map_err(|message| EngineError::InvalidRecord { row, message })
    }

    fn convert(self, row: usize) -> Result<Applicant, String> {
        let age = count("age", &self.age)?.ok_or("column 'age': value is required")?;
        let name = cell(&self.name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("row{row}"));
        let applicant_type = cell(&self.applicant_type)
            .map(|value| ApplicantType::from(value.to_string()))
            .unwrap_or(ApplicantType::Salaried);

        let mut applicant = Applicant::new(name, applicant_type, age);
        applicant.gross_monthly_income = decimal("gross_monthly_income", &self.gross_monthly_income)?;
        applicant.gross_annual_income = decimal("gross_annual_income", &self.gross_annual_income)?;
        applicant.cibil_score = count("cibil_score", &self.cibil_score)?;
        applicant.salary_account_with_bank = flag("salary_account_with_bom", &self.salary_account_with_bom)?;
        applicant.category = categorical("category", &self.category, str::to_uppercase)?;
        applicant.work_experience_years =
            decimal("work_experience_years", &self.work_experience_years)?.unwrap_or_default();
        applicant.marital_status = categorical("marital_status", &self.marital_status, str::to_lowercase)?;
        applicant.dependents = count("dependents", &self.dependents)?.unwrap_or(0);
        applicant.bank_relationship_years =
            count("bank_relationship_years", &self.bank_relationship_years)?.unwrap_or(0);
        applicant.residence_type = categorical("residence_type", &self.residence_type, str::to_lowercase)?;
        applicant.years_at_address = count("years_at_address", &self.years_at_address)?.unwrap_or(0);
        applicant.spouse_income_annual =
            decimal("spouse_income_annual", &self.spouse_income_annual)?.unwrap_or_default();
        applicant.disposable_monthly_income =
            decimal("disposable_monthly_income", &self.disposable_monthly_income)?.unwrap_or_default();
        applicant.emi_nmi_ratio_percent = decimal("emi_nmi_ratio_percent", &self.emi_nmi_ratio_percent)?;
        applicant.repayment_type = categorical("repayment_type", &self.repayment_type, str::to_lowercase)?;
        applicant.itr_years_filed = count("itr_years_filed", &self.itr_years_filed)?.unwrap_or(0);
        applicant.avg_balance_to_emi_ratio_percent = decimal(
            "avg_balance_to_emi_ratio_percent",
            &self.avg_balance_to_emi_ratio_percent,
        )?;
        applicant.credit_history_score_choice = categorical(
            "credit_history_score_choice",
            &self.credit_history_score_choice,
            str::to_lowercase,
        )?;
        applicant.net_worth = decimal("net_worth", &self.net_worth)?;
        applicant.proposed_loan_amount = decimal("proposed_loan_amount", &self.proposed_loan_amount)?;
        applicant.business_turnover_annual =
            decimal("business_turnover_annual", &self.business_turnover_annual)?;
        applicant.income_trend = categorical("income_trend", &self.income_trend, str::to_lowercase)?;

        applicant.compliance = ComplianceFlags {
            kyc_ok: flag("kyc_ok", &self.kyc_ok)?,
            payslips_ok: flag("payslips_ok", &self.payslips_ok)?,
            fraud_ok: flag("fraud_ok", &self.fraud_ok)?,
            bank_rel_ok: flag("bank_rel_ok", &self.bank_rel_ok)?,
            address_ok: flag("address_ok", &self.address_ok)?,
        };
        applicant.visit = VisitReport {
            officer: cell(&self.visit_officer).map(str::to_string),
            date: date("visit_date", &self.visit_date)?,
            verified: flag("visit_verified", &self.visit_verified)?,
            remarks: cell(&self.visit_remarks).map(str::to_string),
        };

        Ok(applicant)
    }

    /// The template row offered to users preparing an import file.
    pub fn sample() -> Self {
        let text = |value: &str| Some(value.to_string());
        Self {
            name: text("Rahul Sharma"),
            applicant_type: text("salaried"),
            age: text("34"),
            gross_monthly_income: text("60000"),
            gross_annual_income: None,
            cibil_score: text("790"),
            salary_account_with_bom: text("true"),
            category: text("A"),
            work_experience_years: text("6"),
            marital_status: text("married"),
            dependents: text("1"),
            bank_relationship_years: text("4"),
            residence_type: text("owned_non_metro"),
            years_at_address: text("4"),
            spouse_income_annual: text("200000"),
            disposable_monthly_income: text("20000"),
            emi_nmi_ratio_percent: text("20"),
            repayment_type: text("si_bom"),
            itr_years_filed: text("3"),
            avg_balance_to_emi_ratio_percent: text("150"),
            credit_history_score_choice: text("best_36m"),
            net_worth: None,
            proposed_loan_amount: text("800000"),
            business_turnover_annual: None,
            income_trend: None,
            kyc_ok: text("true"),
            payslips_ok: text("true"),
            fraud_ok: text("true"),
            bank_rel_ok: text("true"),
            address_ok: text("true"),
            visit_officer: text("Officer A"),
            visit_date: text("2025-11-01"),
            visit_verified: text("true"),
            visit_remarks: text("OK"),
        }
    }
}

fn cell(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn decimal(column: &str, value: &Option<String>) -> Result<Option<Decimal>, String> {
    let Some(raw) = cell(value) else {
        return Ok(None);
    };
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map(Some)
        .map_err(|_| format!("column '{column}': expected a number, got '{raw}'"))
}

/// Whole, non-negative numbers; spreadsheet exports often write `34.0`.
fn count(column: &str, value: &Option<String>) -> Result<Option<u32>, String> {
    let Some(raw) = cell(value) else {
        return Ok(None);
    };
    if let Ok(n) = raw.parse::<u32>() {
        return Ok(Some(n));
    }
    Decimal::from_str(raw)
        .ok()
        .filter(|d| d.fract().is_zero())
        .and_then(|d| d.to_u32())
        .map(Some)
        .ok_or_else(|| format!("column '{column}': expected a whole number, got '{raw}'"))
}

fn flag(column: &str, value: &Option<String>) -> Result<bool, String> {
    let Some(raw) = cell(value) else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "1.0" => Ok(true),
        "false" | "no" | "n" | "0" | "0.0" => Ok(false),
        _ => Err(format!("column '{column}': expected true/false, got '{raw}'")),
    }
}

fn date(column: &str, value: &Option<String>) -> Result<Option<NaiveDate>, String> {
    let Some(raw) = cell(value) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("column '{column}': expected YYYY-MM-DD, got '{raw}'"))
}

fn categorical<T: DeserializeOwned>(
    column: &str,
    value: &Option<String>,
    normalize: fn(&str) -> String,
) -> Result<Option<T>, String> {
    let Some(raw) = cell(value) else {
        return Ok(None);
    };
    let normalized = normalize(raw);
    let deserializer: serde::de::value::StrDeserializer<'_, serde::de::value::Error> =
        normalized.as_str().into_deserializer();
    T::deserialize(deserializer)
        .map(Some)
        .map_err(|_| format!("column '{column}': unrecognized value '{raw}'"))
}
