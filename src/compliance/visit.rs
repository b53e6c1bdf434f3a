//! Pre-sanction visit report (PSVR) gate.

use serde_json::{Value, json};

use crate::models::{Applicant, Details};

use super::{ComplianceCheck, GateOutcome};

/// Requires a satisfactory pre-sanction visit.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreSanctionVisit;

impl ComplianceCheck for PreSanctionVisit {
    fn rule_id(&self) -> &'static str {
        "psvr_verification"
    }

    fn rule_name(&self) -> &'static str {
        "Pre-Sanction Visit Report"
    }

    fn check(&self, applicant: &Applicant) -> GateOutcome {
        let visit = &applicant.visit;
        if visit.verified {
            return GateOutcome::Pass;
        }

        let mut details = Details::new();
        details.insert("visit_verified".to_string(), Value::Bool(false));
        details.insert("visit_officer".to_string(), json!(visit.officer));

        GateOutcome::Fail {
            reason: "PSVR incomplete or not satisfactory: cannot sanction until PSVR verified."
                .to_string(),
            details,
        }
    }
}
