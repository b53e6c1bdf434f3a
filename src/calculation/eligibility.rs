//! Eligibility gating and loan recommendation.
//!
//! This module provides the [`DecisionEngine`], which runs an applicant
//! through the policy's gates in order, scores and prices it, and returns a
//! [`Decision`] with a complete audit trace. Any gate may end evaluation
//! early with an ineligible decision citing the rule that failed.

use std::fmt;

use rust_decimal::Decimal;
use serde_json::{Value, json};
use tracing::debug;

use crate::compliance::{ComplianceCheck, GateOutcome, standard_checks};
use crate::config::PolicyConfig;
use crate::models::{
    Applicant, AuditStep, AuditTrace, AuditWarning, Decision, Details, ScoreCard,
};

use super::emi::calculate_emi;
use super::interest_rate::RateResolver;
use super::loan_terms::{gross_monthly_income, loan_terms};
use super::scoring::Scorer;

/// Rule id recorded when the final grade decides the outcome.
pub const GRADE_OUTCOME_RULE: &str = "grade_outcome";

/// Evaluates applicants against one immutable policy.
///
/// The engine holds no mutable state: evaluating the same applicant twice
/// yields identical decisions, and one engine may be shared across threads.
///
/// # Example
///
/// ```
/// use loan_engine::calculation::DecisionEngine;
/// use loan_engine::config::ConfigLoader;
/// use loan_engine::models::{Applicant, ApplicantType};
/// use rust_decimal::Decimal;
///
/// let engine = DecisionEngine::new(ConfigLoader::builtin()?.into_config());
///
/// let mut applicant = Applicant::new("Asha", ApplicantType::Salaried, 60);
/// applicant.cibil_score = Some(760);
///
/// let decision = engine.evaluate(&applicant, Decimal::new(1015, 2));
/// assert!(!decision.eligible);
/// assert_eq!(decision.decided_by, "salaried_age_band");
/// # Ok::<(), loan_engine::error::EngineError>(())
/// ```
pub struct DecisionEngine {
    policy: PolicyConfig,
    checks: Vec<Box<dyn ComplianceCheck>>,
}

impl DecisionEngine {
    /// Creates an engine with no compliance gates.
    pub fn new(policy: PolicyConfig) -> Self {
        Self {
            policy,
            checks: Vec::new(),
        }
    }

    /// Creates an engine that enforces the document checklist and the
    /// pre-sanction visit before scoring.
    pub fn with_compliance(policy: PolicyConfig) -> Self {
        Self {
            policy,
            checks: standard_checks(),
        }
    }

    /// Appends a compliance check; checks run in the order they were added.
    pub fn with_check(mut self, check: impl ComplianceCheck + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Returns the policy this engine evaluates against.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Rule ids of the installed compliance checks, in order.
    pub fn check_ids(&self) -> Vec<&'static str> {
        self.checks.iter().map(|check| check.rule_id()).collect()
    }

    /// Evaluates one applicant at the given reference rate.
    ///
    /// Never fails: every input yields a well-formed decision.
    pub fn evaluate(&self, applicant: &Applicant, base_rate: Decimal) -> Decision {
        let mut trace = Trace::default();
        let eligibility = self.policy.eligibility();

        for check in &self.checks {
            match check.check(applicant) {
                GateOutcome::Pass => trace.record(
                    check.rule_id(),
                    check.rule_name(),
                    json!({ "applicant": applicant.name }),
                    json!({ "passed": true }),
                    "Prerequisite met".to_string(),
                ),
                GateOutcome::Fail { reason, details } => {
                    trace.record(
                        check.rule_id(),
                        check.rule_name(),
                        json!({ "applicant": applicant.name }),
                        json!({ "passed": false, "details": details }),
                        reason.clone(),
                    );
                    return trace.reject(check.rule_id(), reason, details);
                }
            }
        }

        // Applicant type
        let type_input = json!({ "applicant_type": applicant.applicant_type.as_str() });
        if !applicant.applicant_type.is_recognized() {
            let reason = unrecognized_type_reason(applicant);
            trace.record(
                "applicant_type",
                "Applicant Type",
                type_input,
                json!({ "passed": false }),
                reason.clone(),
            );
            return trace.reject("applicant_type", reason, Details::new());
        }
        trace.record(
            "applicant_type",
            "Applicant Type",
            type_input,
            json!({ "passed": true }),
            format!("'{}' has a scoring formula", applicant.applicant_type),
        );

        // CIBIL cut-off
        let cutoff = eligibility.cibil_cutoff;
        let cibil_input = json!({ "cibil_score": applicant.cibil_score, "cutoff": cutoff });
        match applicant.cibil_score {
            Some(score) if score < cutoff => {
                let reason = format!("CIBIL score below minimum cut-off {cutoff} (CIBIL={score})");
                trace.record(
                    "cibil_cutoff",
                    "CIBIL Cut-off",
                    cibil_input,
                    json!({ "passed": false }),
                    reason.clone(),
                );
                return trace.reject("cibil_cutoff", reason, Details::new());
            }
            Some(score) => trace.record(
                "cibil_cutoff",
                "CIBIL Cut-off",
                cibil_input,
                json!({ "passed": true }),
                format!("{score} >= {cutoff}"),
            ),
            None if eligibility.allow_missing_cibil => {
                trace.warn(
                    "CIBIL_ABSENT",
                    "No CIBIL score supplied; cut-off not applied",
                    "medium",
                );
                trace.record(
                    "cibil_cutoff",
                    "CIBIL Cut-off",
                    cibil_input,
                    json!({ "passed": true, "score_absent": true }),
                    "No CIBIL score; proceeding with caution".to_string(),
                );
            }
            None => {
                let reason = format!("CIBIL score missing; minimum cut-off {cutoff} applies");
                trace.record(
                    "cibil_cutoff",
                    "CIBIL Cut-off",
                    cibil_input,
                    json!({ "passed": false, "score_absent": true }),
                    reason.clone(),
                );
                return trace.reject("cibil_cutoff", reason, Details::new());
            }
        }

        // Salaried age band
        if applicant.is_salaried() {
            let band = eligibility.salaried_age;
            let age_input = json!({ "age": applicant.age, "min": band.min, "max": band.max });
            if !band.contains(applicant.age) {
                let reason = format!(
                    "Age not within permissible range for salaried ({}-{}). Age={}",
                    band.min, band.max, applicant.age
                );
                trace.record(
                    "salaried_age_band",
                    "Salaried Age Band",
                    age_input,
                    json!({ "passed": false }),
                    reason.clone(),
                );
                return trace.reject("salaried_age_band", reason, Details::new());
            }
            trace.record(
                "salaried_age_band",
                "Salaried Age Band",
                age_input,
                json!({ "passed": true }),
                format!("{} <= {} <= {}", band.min, applicant.age, band.max),
            );
        }

        // Score
        let Some(card) = Scorer::new(self.policy.scoring()).score(applicant) else {
            return trace.reject(
                "applicant_type",
                unrecognized_type_reason(applicant),
                Details::new(),
            );
        };
        if applicant.credit_history_score_choice.is_none() {
            trace.warn(
                "CREDIT_HISTORY_DEFAULTED",
                "No credit-history category supplied; scored with the policy default",
                "medium",
            );
        }
        let score_rule = if applicant.is_professional() {
            "score_professional"
        } else {
            "score_salaried"
        };
        trace.record(
            score_rule,
            "Composite Score",
            score_contributions(&card),
            json!({
                "raw_total": decimal(card.raw_total),
                "score": decimal(card.score),
                "grade": card.grade,
            }),
            format!("Score {} maps to grade {}", card.score.normalize(), card.grade),
        );

        // Loan terms
        let terms = loan_terms(applicant, eligibility);
        trace.record(
            "loan_terms",
            "Loan Terms",
            json!({
                "gross_monthly_income": applicant.gross_monthly_income.map(decimal),
                "gross_annual_income": applicant.gross_annual_income.map(decimal),
                "category": applicant.category,
                "salary_account_with_bank": applicant.salary_account_with_bank,
            }),
            json!({
                "income_limit": decimal(terms.income_limit),
                "eligibility_cap": decimal(terms.eligibility_cap),
                "tenure_months": terms.tenure_months,
                "deduction_limit_pct": decimal(terms.deduction_limit_pct),
            }),
            format!(
                "min({}, {}) = {}; {} months; deduction norm {}%",
                terms.income_limit.normalize(),
                eligibility.max_loan_amount.normalize(),
                terms.eligibility_cap.normalize(),
                terms.tenure_months,
                terms.deduction_limit_pct.normalize()
            ),
        );

        // Pricing
        let proposed = applicant
            .requested_amount()
            .unwrap_or(terms.eligibility_cap);
        let quote = RateResolver::new(self.policy.rates()).quote(applicant, base_rate);
        let annual_rate = quote.annual_rate_percent;
        let emi = calculate_emi(proposed, annual_rate, terms.tenure_months);
        trace.record(
            "pricing",
            "Rate and EMI",
            json!({
                "proposed": decimal(proposed),
                "base_rate": decimal(base_rate),
                "cibil_slab": quote.slab,
                "tenure_months": terms.tenure_months,
            }),
            json!({
                "spread": decimal(quote.spread),
                "spread_source": quote.source,
                "annual_rate_percent": decimal(annual_rate),
                "emi": decimal(emi),
            }),
            format!(
                "{}% + {}% = {}%; EMI {:.2} over {} months",
                base_rate.normalize(),
                quote.spread.normalize(),
                annual_rate.normalize(),
                emi,
                terms.tenure_months
            ),
        );

        // Income data
        let gross_monthly = gross_monthly_income(applicant);
        if gross_monthly <= Decimal::ZERO {
            let reason = "Insufficient income data to compute eligibility".to_string();
            trace.record(
                "income_data",
                "Income Data",
                json!({ "gross_monthly": decimal(gross_monthly) }),
                json!({ "passed": false }),
                reason.clone(),
            );
            let mut details = score_details(&card);
            details.insert("gross_monthly".to_string(), decimal(gross_monthly));
            return trace.reject("income_data", reason, details);
        }
        trace.record(
            "income_data",
            "Income Data",
            json!({ "gross_monthly": decimal(gross_monthly) }),
            json!({ "passed": true }),
            format!("Gross monthly income {}", gross_monthly.normalize()),
        );

        // Deduction norm
        let proposed_emi_pct = emi
            .checked_div(gross_monthly)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or_else(|| {
                trace.warn(
                    "EMI_RATIO_SATURATED",
                    "EMI share of gross monthly income exceeds the representable range",
                    "high",
                );
                Decimal::MAX
            });
        let limit = terms.deduction_limit_pct;
        let norm_input = json!({
            "emi": decimal(emi),
            "gross_monthly": decimal(gross_monthly),
            "deduction_limit_pct": decimal(limit),
        });
        if proposed_emi_pct > limit {
            let reason = format!(
                "Proposed EMI {:.2} (={:.2}% of gross monthly) exceeds allowed deduction norm of {}%.",
                emi,
                proposed_emi_pct,
                limit.normalize()
            );
            trace.record(
                "deduction_norm",
                "Deduction Norm",
                norm_input,
                json!({ "proposed_emi_pct": decimal(proposed_emi_pct), "passed": false }),
                reason.clone(),
            );
            let mut details = score_details(&card);
            details.insert("proposed_emi_pct".to_string(), decimal(proposed_emi_pct));
            details.insert("deduction_limit_pct".to_string(), decimal(limit));
            return trace.reject("deduction_norm", reason, details);
        }
        trace.record(
            "deduction_norm",
            "Deduction Norm",
            norm_input,
            json!({ "proposed_emi_pct": decimal(proposed_emi_pct), "passed": true }),
            format!("{:.2}% <= {}%", proposed_emi_pct, limit.normalize()),
        );

        // Recommendation
        let recommended = proposed.min(terms.eligibility_cap);
        let recommended_emi = if recommended == proposed {
            emi
        } else {
            calculate_emi(recommended, annual_rate, terms.tenure_months)
        };
        trace.record(
            "recommendation",
            "Recommended Amount",
            json!({
                "proposed": decimal(proposed),
                "eligibility_cap": decimal(terms.eligibility_cap),
            }),
            json!({
                "recommended_loan": decimal(recommended),
                "emi": decimal(recommended_emi),
            }),
            format!(
                "min({}, {}) = {}",
                proposed.normalize(),
                terms.eligibility_cap.normalize(),
                recommended.normalize()
            ),
        );

        // Grade outcome
        let max_grade = eligibility.max_sanction_grade;
        let eligible = card.grade <= max_grade;
        let reason = if card.grade == 1 {
            "Clear sanction"
        } else if eligible {
            "Sanction with normal authority"
        } else {
            "Requires higher authority/decline"
        };
        trace.record(
            GRADE_OUTCOME_RULE,
            "Grade Outcome",
            json!({ "grade": card.grade, "max_sanction_grade": max_grade }),
            json!({ "eligible": eligible }),
            reason.to_string(),
        );
        debug!(
            applicant = %applicant.name,
            grade = card.grade,
            eligible,
            "evaluation complete"
        );

        let mut details = Details::new();
        details.insert("proposed".to_string(), decimal(proposed));
        details.insert("eligible_by_income".to_string(), decimal(terms.eligibility_cap));
        details.insert("proposed_emi_pct".to_string(), decimal(proposed_emi_pct));

        Decision {
            eligible,
            reason: reason.to_string(),
            decided_by: GRADE_OUTCOME_RULE.to_string(),
            recommended_loan: recommended,
            tenure_months: terms.tenure_months,
            annual_rate_percent: annual_rate,
            emi: recommended_emi,
            score: Some(card.score),
            grade: Some(card.grade),
            details,
            audit: trace.finish(),
        }
    }
}

impl fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("policy", &self.policy.metadata().code)
            .field("checks", &self.check_ids())
            .finish()
    }
}

/// Accumulates audit steps and warnings during one evaluation.
#[derive(Debug, Default)]
struct Trace {
    audit: AuditTrace,
}

impl Trace {
    fn record(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        input: Value,
        output: Value,
        reasoning: String,
    ) {
        debug!(rule_id, %reasoning, "rule applied");
        let step_number = self.audit.steps.len() as u32 + 1;
        self.audit.steps.push(AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            input,
            output,
            reasoning,
        });
    }

    fn warn(&mut self, code: &str, message: &str, severity: &str) {
        self.audit.warnings.push(AuditWarning {
            code: code.to_string(),
            message: message.to_string(),
            severity: severity.to_string(),
        });
    }

    fn reject(self, rule_id: &str, reason: String, details: Details) -> Decision {
        debug!(rule_id, %reason, "application rejected");
        Decision::rejected(rule_id, reason)
            .with_details(details)
            .with_audit(self.audit)
    }

    fn finish(self) -> AuditTrace {
        self.audit
    }
}

fn unrecognized_type_reason(applicant: &Applicant) -> String {
    format!(
        "Applicant type must be 'salaried' or 'professional' (got '{}')",
        applicant.applicant_type
    )
}

fn decimal(value: Decimal) -> Value {
    Value::String(value.to_string())
}

fn score_details(card: &ScoreCard) -> Details {
    let mut details = Details::new();
    details.insert("score".to_string(), decimal(card.score));
    details.insert("grade".to_string(), json!(card.grade));
    details
}

fn score_contributions(card: &ScoreCard) -> Value {
    let contributions: serde_json::Map<String, Value> = card
        .contributions
        .iter()
        .map(|c| (c.dimension.clone(), json!({ "input": c.input, "points": decimal(c.points) })))
        .collect();
    Value::Object(contributions)
}
