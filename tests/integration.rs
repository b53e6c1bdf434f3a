//! Integration tests for the Loan Decision Engine.
//!
//! This suite drives the HTTP API end to end and covers:
//! - Salaried pricing, tenure and eligibility cap
//! - CIBIL cut-off and salaried age band rejections
//! - Professional net-worth scoring
//! - The compliance variant (checklist and PSVR gates)
//! - The non-monotonic EMI/NMI band
//! - Batch evaluation, sanction summaries and the policy endpoint
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use loan_engine::api::{AppState, create_router};
use loan_engine::calculation::DecisionEngine;
use loan_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_router_for_test() -> Router {
    let policy = ConfigLoader::load("./config/personal_loan")
        .expect("Failed to load config")
        .into_config();
    create_router(AppState::new(DecisionEngine::new(policy), decimal("10.15")))
}

fn create_compliance_router() -> Router {
    let policy = ConfigLoader::builtin()
        .expect("Failed to load config")
        .into_config();
    create_router(AppState::new(
        DecisionEngine::with_compliance(policy),
        decimal("10.15"),
    ))
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Reads a decimal that was serialized as a string.
fn decimal_field(value: &Value) -> Decimal {
    decimal(value.as_str().expect("decimal serialized as string"))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn evaluate(router: Router, applicant: Value) -> Value {
    let (status, body) = post(router, "/evaluate", json!({ "applicant": applicant })).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    body
}

fn salaried_applicant() -> Value {
    json!({
        "name": "Rahul Sharma",
        "applicant_type": "salaried",
        "age": 34,
        "gross_monthly_income": "60000",
        "cibil_score": 810,
        "salary_account_with_bom": true,
        "category": "A",
        "work_experience_years": "8",
        "marital_status": "married",
        "dependents": 2,
        "bank_relationship_years": 4,
        "residence_type": "owned_metro",
        "years_at_address": 6,
        "disposable_monthly_income": "25000",
        "emi_nmi_ratio_percent": "22",
        "repayment_type": "checkoff",
        "itr_years_filed": 3,
        "avg_balance_to_emi_ratio_percent": "150",
        "credit_history_score_choice": "best_36m",
        "proposed_loan_amount": "800000"
    })
}

fn professional_applicant() -> Value {
    json!({
        "name": "Dr. Meera Iyer",
        "applicant_type": "professional",
        "age": 45,
        "gross_annual_income": "2400000",
        "cibil_score": 780,
        "work_experience_years": "15",
        "marital_status": "married",
        "dependents": 1,
        "bank_relationship_years": 5,
        "residence_type": "owned_metro",
        "years_at_address": 10,
        "disposable_monthly_income": "80000",
        "emi_nmi_ratio_percent": "20",
        "itr_years_filed": 5,
        "net_worth": "0",
        "proposed_loan_amount": "1000000",
        "business_turnover_annual": "5000000",
        "income_trend": "increasing"
    })
}

fn with_field(mut applicant: Value, key: &str, value: Value) -> Value {
    applicant[key] = value;
    applicant
}

fn audit_rule_ids(decision: &Value) -> Vec<String> {
    decision["audit"]["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|step| step["rule_id"].as_str().unwrap().to_string())
        .collect()
}

fn score_points(decision: &Value, dimension: &str) -> Decimal {
    let step = decision["audit"]["steps"]
        .as_array()
        .unwrap()
        .iter()
        .find(|step| {
            let id = step["rule_id"].as_str().unwrap();
            id == "score_salaried" || id == "score_professional"
        })
        .expect("score step recorded");
    decimal_field(&step["input"][dimension]["points"])
}

// =============================================================================
// Salaried Pricing and Sizing
// =============================================================================

#[tokio::test]
async fn test_salaried_category_a_priced_from_table() {
    let decision = evaluate(create_router_for_test(), salaried_applicant()).await;

    assert_eq!(decimal_field(&decision["annual_rate_percent"]), decimal("10.85"));
    assert_eq!(decision["tenure_months"], json!(84));
    assert_eq!(decimal_field(&decision["details"]["eligible_by_income"]), decimal("1200000"));
    assert!(decimal_field(&decision["recommended_loan"]) <= decimal("1200000"));
    assert_eq!(decimal_field(&decision["recommended_loan"]), decimal("800000"));
    assert!(decimal_field(&decision["emi"]) > Decimal::ZERO);
}

#[tokio::test]
async fn test_salaried_without_bank_salary_account_gets_standard_tenure() {
    let applicant = with_field(salaried_applicant(), "salary_account_with_bom", json!(false));
    let decision = evaluate(create_router_for_test(), applicant).await;

    assert_eq!(decision["tenure_months"], json!(60));
}

#[tokio::test]
async fn test_proposed_above_cap_is_reduced_to_cap() {
    let applicant = with_field(salaried_applicant(), "proposed_loan_amount", json!("1500000"));
    let decision = evaluate(create_router_for_test(), applicant).await;

    assert_eq!(decimal_field(&decision["recommended_loan"]), decimal("1200000"));
    assert_eq!(decimal_field(&decision["details"]["proposed"]), decimal("1500000"));
}

#[tokio::test]
async fn test_audit_records_gates_in_order() {
    let decision = evaluate(create_router_for_test(), salaried_applicant()).await;

    assert_eq!(
        audit_rule_ids(&decision),
        vec![
            "applicant_type",
            "cibil_cutoff",
            "salaried_age_band",
            "score_salaried",
            "loan_terms",
            "pricing",
            "income_data",
            "deduction_norm",
            "recommendation",
            "grade_outcome",
        ]
    );
    assert_eq!(decision["decided_by"], json!("grade_outcome"));
}

// =============================================================================
// Gate Rejections
// =============================================================================

#[tokio::test]
async fn test_cibil_below_cutoff_rejected_without_score() {
    let applicant = with_field(salaried_applicant(), "cibil_score", json!(650));
    let decision = evaluate(create_router_for_test(), applicant).await;

    assert_eq!(decision["eligible"], json!(false));
    assert!(
        decision["reason"]
            .as_str()
            .unwrap()
            .contains("below minimum cut-off 700")
    );
    assert_eq!(decision["score"], Value::Null);
    assert_eq!(decision["grade"], Value::Null);
    assert_eq!(decision["decided_by"], json!("cibil_cutoff"));
}

#[tokio::test]
async fn test_salaried_age_out_of_band_rejected() {
    let applicant = with_field(salaried_applicant(), "age", json!(60));
    let decision = evaluate(create_router_for_test(), applicant).await;

    assert_eq!(decision["eligible"], json!(false));
    let reason = decision["reason"].as_str().unwrap();
    assert!(reason.contains("21-58"), "reason was: {}", reason);
    assert!(reason.contains("Age=60"));
    assert_eq!(decision["score"], Value::Null);
}

#[tokio::test]
async fn test_unrecognized_applicant_type_rejected() {
    let applicant = with_field(salaried_applicant(), "applicant_type", json!("pensioner"));
    let decision = evaluate(create_router_for_test(), applicant).await;

    assert_eq!(decision["eligible"], json!(false));
    assert_eq!(decision["decided_by"], json!("applicant_type"));
    assert!(decision["reason"].as_str().unwrap().contains("pensioner"));
}

#[tokio::test]
async fn test_professional_age_not_banded() {
    let applicant = with_field(professional_applicant(), "age", json!(66));
    let decision = evaluate(create_router_for_test(), applicant).await;

    assert!(!audit_rule_ids(&decision).contains(&"salaried_age_band".to_string()));
    assert!(decision["score"].is_string());
}

// =============================================================================
// Scoring
// =============================================================================

#[tokio::test]
async fn test_professional_zero_net_worth_scores_nothing() {
    let decision = evaluate(create_router_for_test(), professional_applicant()).await;

    assert_eq!(score_points(&decision, "net_worth_ratio"), Decimal::ZERO);
    assert!(decision["score"].is_string());
}

#[tokio::test]
async fn test_emi_nmi_band_is_non_monotonic() {
    let cases = [("22", "10"), ("19", "0"), ("26", "8")];

    for (ratio, expected) in cases {
        let applicant = with_field(salaried_applicant(), "emi_nmi_ratio_percent", json!(ratio));
        let decision = evaluate(create_router_for_test(), applicant).await;
        assert_eq!(
            score_points(&decision, "emi_nmi_ratio"),
            decimal(expected),
            "EMI/NMI ratio {}",
            ratio
        );
    }
}

#[tokio::test]
async fn test_missing_cibil_allowed_with_warning() {
    let mut applicant = salaried_applicant();
    applicant.as_object_mut().unwrap().remove("cibil_score");
    let decision = evaluate(create_router_for_test(), applicant).await;

    assert!(decision["score"].is_string());
    let warnings = decision["audit"]["warnings"].as_array().unwrap();
    assert!(warnings.iter().any(|w| w["code"] == json!("CIBIL_ABSENT")));
}

// =============================================================================
// Compliance Variant
// =============================================================================

#[tokio::test]
async fn test_unverified_visit_rejected_before_scoring() {
    let mut applicant = salaried_applicant();
    for flag in ["kyc_ok", "payslips_ok", "fraud_ok", "bank_rel_ok", "address_ok"] {
        applicant[flag] = json!(true);
    }
    applicant["visit_verified"] = json!(false);

    let decision = evaluate(create_compliance_router(), applicant).await;

    assert_eq!(decision["eligible"], json!(false));
    assert!(decision["reason"].as_str().unwrap().contains("PSVR incomplete"));
    assert_eq!(decision["score"], Value::Null);
    assert_eq!(decision["decided_by"], json!("psvr_verification"));
    assert_eq!(
        audit_rule_ids(&decision),
        vec!["compliance_checklist", "psvr_verification"]
    );
}

#[tokio::test]
async fn test_incomplete_checklist_lists_unmet_flags() {
    let decision = evaluate(create_compliance_router(), salaried_applicant()).await;

    assert_eq!(decision["decided_by"], json!("compliance_checklist"));
    assert!(decision["reason"].as_str().unwrap().contains("kyc_ok"));
    assert_eq!(decision["details"]["kyc_ok"], json!(false));
}

#[tokio::test]
async fn test_compliant_applicant_matches_plain_variant() {
    let mut applicant = salaried_applicant();
    for flag in ["kyc_ok", "payslips_ok", "fraud_ok", "bank_rel_ok", "address_ok"] {
        applicant[flag] = json!(true);
    }
    applicant["visit_verified"] = json!(true);
    applicant["visit_officer"] = json!("A. Kulkarni");

    let plain = evaluate(create_router_for_test(), applicant.clone()).await;
    let compliant = evaluate(create_compliance_router(), applicant).await;

    assert_eq!(plain["score"], compliant["score"]);
    assert_eq!(plain["recommended_loan"], compliant["recommended_loan"]);
    assert_eq!(plain["reason"], compliant["reason"]);
}

// =============================================================================
// Extreme Amounts
// =============================================================================

const DECIMAL_MAX: &str = "79228162514264337593543950335";

#[tokio::test]
async fn test_tiny_income_rejected_by_deduction_norm() {
    let applicant = with_field(
        salaried_applicant(),
        "gross_monthly_income",
        json!("0.0000000000000000000000000001"),
    );
    let decision = evaluate(create_router_for_test(), applicant).await;

    assert_eq!(decision["eligible"], json!(false));
    assert_eq!(decision["decided_by"], json!("deduction_norm"));
    assert_eq!(decision["details"]["proposed_emi_pct"], json!(DECIMAL_MAX));
    assert_eq!(decision["audit"]["warnings"][0]["code"], json!("EMI_RATIO_SATURATED"));
}

#[tokio::test]
async fn test_maximum_amounts_evaluated_in_batch() {
    let huge = with_field(
        with_field(salaried_applicant(), "gross_monthly_income", json!(DECIMAL_MAX)),
        "proposed_loan_amount",
        json!(DECIMAL_MAX),
    );
    let applicants = json!([huge, salaried_applicant()]);

    let (status, body) = post(
        create_router_for_test(),
        "/evaluate/batch",
        json!({ "applicants": applicants }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let decisions = body["decisions"].as_array().unwrap();
    assert_eq!(decimal_field(&decisions[0]["recommended_loan"]), decimal("2000000"));
    assert_eq!(decisions[1]["decided_by"], json!("grade_outcome"));

    let (status, body) = post(
        create_router_for_test(),
        "/evaluate/batch",
        json!({ "applicants": applicants, "base_rate": DECIMAL_MAX }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["decisions"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Batch, Sanction Summary and Policy
// =============================================================================

#[tokio::test]
async fn test_batch_preserves_order() {
    let applicants = json!([
        salaried_applicant(),
        with_field(salaried_applicant(), "cibil_score", json!(650)),
        professional_applicant(),
    ]);

    let (status, body) = post(
        create_router_for_test(),
        "/evaluate/batch",
        json!({ "applicants": applicants, "base_rate": "9.50" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let decisions = body["decisions"].as_array().unwrap();
    assert_eq!(decisions.len(), 3);
    assert_eq!(decisions[0]["decided_by"], json!("grade_outcome"));
    assert_eq!(decisions[1]["decided_by"], json!("cibil_cutoff"));
    assert_eq!(decimal_field(&decisions[0]["annual_rate_percent"]), decimal("10.20"));
}

#[tokio::test]
async fn test_sanction_summary_copies_decision_values() {
    let router = create_router_for_test();
    let decision = evaluate(router.clone(), salaried_applicant()).await;

    let (status, summary) = post(
        router,
        "/sanction-summary",
        json!({ "applicant": salaried_applicant() }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["ApplicantName"], json!("Rahul Sharma"));
    assert_eq!(summary["CIBIL"], json!(810));
    assert_eq!(summary["LoanAmount"], decision["recommended_loan"]);
    assert_eq!(summary["EMI"], decision["emi"]);
    assert_eq!(summary["SanctionType"], decision["reason"]);
    assert_eq!(summary["PSVR"]["Verified"], json!(false));
}

#[tokio::test]
async fn test_policy_endpoint_lists_compliance_checks() {
    let (status, body) = send(
        create_compliance_router(),
        Request::builder()
            .uri("/policy")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["policy"]["code"], json!("PL-MC-2025"));
    assert_eq!(
        body["compliance_checks"],
        json!(["compliance_checklist", "psvr_verification"])
    );
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let (status, body) = send(
        create_router_for_test(),
        Request::builder()
            .method("POST")
            .uri("/evaluate")
            .header("Content-Type", "application/json")
            .body(Body::from("{\"applicant\": "))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("MALFORMED_JSON"));
}

#[tokio::test]
async fn test_missing_applicant_returns_validation_error() {
    let (status, body) = post(create_router_for_test(), "/evaluate", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_wrong_field_type_returns_malformed_json() {
    let applicant = with_field(salaried_applicant(), "age", json!("thirty"));
    let (status, body) = post(
        create_router_for_test(),
        "/evaluate",
        json!({ "applicant": applicant }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("MALFORMED_JSON"));
}
