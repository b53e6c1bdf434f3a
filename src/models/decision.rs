//! Decision models for the loan decision engine.
//!
//! This module contains the [`Decision`] type returned for every evaluation
//! and the [`AuditTrace`] that records each rule applied on the way to it.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Open mapping of diagnostic values attached to a decision.
pub type Details = BTreeMap<String, serde_json::Value>;

/// A single step in the audit trace recording a policy decision.
///
/// Each step captures the input, output, and reasoning for one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning raised during evaluation.
///
/// Warnings flag policy defaults that were applied silently, such as a
/// missing bureau score being allowed through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The ordered list of steps.
    pub steps: Vec<AuditStep>,
    /// Warnings generated along the way.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Finds the first step recorded for a rule.
    pub fn step(&self, rule_id: &str) -> Option<&AuditStep> {
        self.steps.iter().find(|step| step.rule_id == rule_id)
    }

    /// Returns true if a warning with the given code was raised.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|warning| warning.code == code)
    }
}

/// The outcome of evaluating one applicant.
///
/// `score`, `grade` and `emi` are populated only when evaluation reaches the
/// scoring stage; early gate failures leave them empty.
///
/// # Example
///
/// ```
/// use loan_engine::models::Decision;
///
/// let decision = Decision::rejected("cibil_cutoff", "CIBIL score below minimum cut-off 700");
/// assert!(!decision.eligible);
/// assert!(decision.score.is_none());
/// assert_eq!(decision.decided_by, "cibil_cutoff");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the loan may be sanctioned under normal authority.
    pub eligible: bool,
    /// Human-readable rule citation.
    pub reason: String,
    /// Identifier of the rule that produced the outcome.
    pub decided_by: String,
    /// Recommended loan amount.
    pub recommended_loan: Decimal,
    /// Repayment tenure in months.
    pub tenure_months: u32,
    /// Priced annual interest rate in percent.
    pub annual_rate_percent: Decimal,
    /// Monthly instalment on the recommended amount.
    pub emi: Decimal,
    /// Composite credit score (0-100).
    pub score: Option<Decimal>,
    /// Risk grade (1-5, lower is stronger).
    pub grade: Option<u8>,
    /// Diagnostic key/value pairs.
    pub details: Details,
    /// Every rule applied, in order.
    pub audit: AuditTrace,
}

impl Decision {
    /// Creates an ineligible decision with no pricing or score.
    pub fn rejected(rule_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            eligible: false,
            reason: reason.into(),
            decided_by: rule_id.into(),
            recommended_loan: Decimal::ZERO,
            tenure_months: 0,
            annual_rate_percent: Decimal::ZERO,
            emi: Decimal::ZERO,
            score: None,
            grade: None,
            details: Details::new(),
            audit: AuditTrace::default(),
        }
    }

    /// Attaches diagnostic details.
    pub fn with_details(mut self, details: Details) -> Self {
        self.details = details;
        self
    }

    /// Attaches the audit trace.
    pub fn with_audit(mut self, audit: AuditTrace) -> Self {
        self.audit = audit;
        self
    }

    /// Reads a detail as a decimal, whether it was stored as a string or number.
    pub fn detail_decimal(&self, key: &str) -> Option<Decimal> {
        match self.details.get(key)? {
            serde_json::Value::String(s) => s.parse().ok(),
            serde_json::Value::Number(n) => n.to_string().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejected_decision_has_no_score() {
        let decision = Decision::rejected("salaried_age_band", "Age out of band");
        assert!(!decision.eligible);
        assert_eq!(decision.score, None);
        assert_eq!(decision.grade, None);
        assert_eq!(decision.emi, Decimal::ZERO);
        assert!(decision.details.is_empty());
    }

    #[test]
    fn test_detail_decimal_reads_string_and_number() {
        let mut details = Details::new();
        details.insert("proposed".to_string(), json!("800000"));
        details.insert("grade".to_string(), json!(3));
        let decision = Decision::rejected("x", "y").with_details(details);

        assert_eq!(decision.detail_decimal("proposed"), Some(Decimal::new(800000, 0)));
        assert_eq!(decision.detail_decimal("grade"), Some(Decimal::new(3, 0)));
        assert_eq!(decision.detail_decimal("missing"), None);
    }

    #[test]
    fn test_audit_trace_lookup() {
        let trace = AuditTrace {
            steps: vec![AuditStep {
                step_number: 1,
                rule_id: "cibil_cutoff".to_string(),
                rule_name: "CIBIL Cut-off".to_string(),
                input: json!({ "cibil_score": 720 }),
                output: json!({ "passed": true }),
                reasoning: "720 >= 700".to_string(),
            }],
            warnings: vec![AuditWarning {
                code: "CIBIL_ABSENT".to_string(),
                message: "m".to_string(),
                severity: "medium".to_string(),
            }],
        };

        assert_eq!(trace.step("cibil_cutoff").unwrap().step_number, 1);
        assert!(trace.step("pricing").is_none());
        assert!(trace.has_warning("CIBIL_ABSENT"));
    }

    #[test]
    fn test_decision_serializes_decimals_as_strings() {
        let mut decision = Decision::rejected("x", "y");
        decision.recommended_loan = Decimal::new(120000000, 2);
        let value = serde_json::to_value(&decision).unwrap();
        assert_eq!(value["recommended_loan"], json!("1200000.00"));
        assert_eq!(value["score"], serde_json::Value::Null);
    }
}
