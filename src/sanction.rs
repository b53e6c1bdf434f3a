//! Sanction annexure summary.
//!
//! A [`SanctionSummary`] pairs an applicant with its decision in the shape
//! of the sanction annexure. It is a view: values are copied from the
//! applicant and decision without recomputation or rounding.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Applicant, Decision, Details};

/// Compliance checklist as printed on the annexure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChecklistView {
    /// PAN and Aadhaar verified.
    #[serde(rename = "KYC")]
    pub kyc: bool,
    /// Payslips or ITRs verified.
    #[serde(rename = "Payslips_ITR")]
    pub payslips_itr: bool,
    /// No fraud history.
    pub fraud_history_clear: bool,
    /// Bank relationship verified.
    pub bank_relation_verified: bool,
    /// Address verified.
    pub address_verified: bool,
}

/// Pre-sanction visit as printed on the annexure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VisitView {
    /// Visiting officer.
    pub officer: Option<String>,
    /// Visit date.
    pub date: Option<NaiveDate>,
    /// Whether the visit was satisfactory.
    pub verified: bool,
    /// Officer's remarks.
    pub remarks: Option<String>,
}

/// The annexure record for one evaluated application.
///
/// # Example
///
/// ```
/// use loan_engine::calculation::DecisionEngine;
/// use loan_engine::config::ConfigLoader;
/// use loan_engine::models::{Applicant, ApplicantType};
/// use loan_engine::sanction::SanctionSummary;
/// use rust_decimal::Decimal;
///
/// let engine = DecisionEngine::new(ConfigLoader::builtin()?.into_config());
/// let mut applicant = Applicant::new("Asha", ApplicantType::Salaried, 34);
/// applicant.cibil_score = Some(640);
/// let decision = engine.evaluate(&applicant, Decimal::new(1015, 2));
///
/// let summary = SanctionSummary::from_decision(&applicant, &decision);
/// assert_eq!(summary.sanction_type, decision.reason);
/// assert!(summary.score.is_none());
/// # Ok::<(), loan_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SanctionSummary {
    /// Applicant's name.
    pub applicant_name: String,
    /// Applicant type as supplied.
    pub applicant_type: String,
    /// Age in years.
    pub age: u32,
    /// Bureau score.
    #[serde(rename = "CIBIL")]
    pub cibil: Option<u32>,
    /// Composite score.
    pub score: Option<Decimal>,
    /// Risk grade.
    pub grade: Option<u8>,
    /// The decision reason, e.g. "Clear sanction".
    pub sanction_type: String,
    /// Whether the decision was eligible.
    pub eligible: bool,
    /// Recommended loan amount.
    pub loan_amount: Decimal,
    /// Tenure in months.
    pub tenure_months: u32,
    /// Priced annual rate.
    pub annual_rate_percent: Decimal,
    /// Monthly instalment.
    #[serde(rename = "EMI")]
    pub emi: Decimal,
    /// Compliance checklist.
    pub compliance_checklist: ChecklistView,
    /// Pre-sanction visit.
    #[serde(rename = "PSVR")]
    pub psvr: VisitView,
    /// The decision's diagnostic details.
    pub decision_details: Details,
}

impl SanctionSummary {
    /// Builds the annexure from an applicant and its decision.
    pub fn from_decision(applicant: &Applicant, decision: &Decision) -> Self {
        let flags = &applicant.compliance;
        let visit = &applicant.visit;
        Self {
            applicant_name: applicant.name.clone(),
            applicant_type: applicant.applicant_type.to_string(),
            age: applicant.age,
            cibil: applicant.cibil_score,
            score: decision.score,
            grade: decision.grade,
            sanction_type: decision.reason.clone(),
            eligible: decision.eligible,
            loan_amount: decision.recommended_loan,
            tenure_months: decision.tenure_months,
            annual_rate_percent: decision.annual_rate_percent,
            emi: decision.emi,
            compliance_checklist: ChecklistView {
                kyc: flags.kyc_ok,
                payslips_itr: flags.payslips_ok,
                fraud_history_clear: flags.fraud_ok,
                bank_relation_verified: flags.bank_rel_ok,
                address_verified: flags.address_ok,
            },
            psvr: VisitView {
                officer: visit.officer.clone(),
                date: visit.date,
                verified: visit.verified,
                remarks: visit.remarks.clone(),
            },
            decision_details: decision.details.clone(),
        }
    }

    /// True when the decision allows a sanction letter: eligible, with every
    /// compliance flag and the visit satisfied.
    pub fn letter_ready(&self) -> bool {
        let c = &self.compliance_checklist;
        self.eligible
            && c.kyc
            && c.payslips_itr
            && c.fraud_history_clear
            && c.bank_relation_verified
            && c.address_verified
            && self.psvr.verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApplicantType, ComplianceFlags};
    use serde_json::json;

    fn decision() -> Decision {
        let mut d = Decision::rejected("grade_outcome", "Clear sanction");
        d.eligible = true;
        d.score = Some(Decimal::new(8450, 2));
        d.grade = Some(1);
        d.recommended_loan = Decimal::new(800000, 0);
        d.tenure_months = 84;
        d.annual_rate_percent = Decimal::new(1085, 2);
        d.emi = Decimal::new(1363412345, 5);
        d
    }

    fn applicant() -> Applicant {
        let mut a = Applicant::new("Rahul Sharma", ApplicantType::Salaried, 34);
        a.cibil_score = Some(810);
        a.compliance = ComplianceFlags {
            kyc_ok: true,
            payslips_ok: true,
            fraud_ok: true,
            bank_rel_ok: true,
            address_ok: true,
        };
        a.visit.officer = Some("Officer A".to_string());
        a.visit.date = NaiveDate::from_ymd_opt(2025, 11, 1);
        a.visit.verified = true;
        a
    }

    #[test]
    fn test_values_copied_verbatim() {
        let d = decision();
        let summary = SanctionSummary::from_decision(&applicant(), &d);
        assert_eq!(summary.emi, d.emi);
        assert_eq!(summary.loan_amount, d.recommended_loan);
        assert_eq!(summary.score, d.score);
        assert!(summary.letter_ready());
    }

    #[test]
    fn test_annexure_field_names() {
        let summary = SanctionSummary::from_decision(&applicant(), &decision());
        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(value["ApplicantName"], json!("Rahul Sharma"));
        assert_eq!(value["CIBIL"], json!(810));
        assert_eq!(value["SanctionType"], json!("Clear sanction"));
        assert_eq!(value["EMI"], json!("13634.12345"));
        assert_eq!(value["ComplianceChecklist"]["KYC"], json!(true));
        assert_eq!(value["ComplianceChecklist"]["Payslips_ITR"], json!(true));
        assert_eq!(value["ComplianceChecklist"]["FraudHistoryClear"], json!(true));
        assert_eq!(value["PSVR"]["Officer"], json!("Officer A"));
        assert_eq!(value["PSVR"]["Date"], json!("2025-11-01"));
    }

    #[test]
    fn test_not_letter_ready_without_visit() {
        let mut a = applicant();
        a.visit.verified = false;
        let summary = SanctionSummary::from_decision(&a, &decision());
        assert!(!summary.letter_ready());
    }
}
