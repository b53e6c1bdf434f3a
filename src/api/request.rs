//! Request types for the loan decision API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Applicant;

/// Request body for `/evaluate` and `/sanction-summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    /// The applicant to evaluate.
    pub applicant: Applicant,
    /// Reference rate in percent; the server default is used when absent.
    #[serde(default)]
    pub base_rate: Option<Decimal>,
}

/// Request body for `/evaluate/batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEvaluateRequest {
    /// Applicants to evaluate, in order.
    pub applicants: Vec<Applicant>,
    /// Reference rate applied to every applicant.
    #[serde(default)]
    pub base_rate: Option<Decimal>,
}
