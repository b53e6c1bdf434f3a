//! KYC and document checklist.

use serde_json::Value;

use crate::models::{Applicant, Details};

use super::{ComplianceCheck, GateOutcome};

/// Requires KYC, payslips or ITRs, clean fraud history, a verified bank
/// relationship and a verified address.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentChecklist;

impl ComplianceCheck for DocumentChecklist {
    fn rule_id(&self) -> &'static str {
        "compliance_checklist"
    }

    fn rule_name(&self) -> &'static str {
        "Compliance Checklist"
    }

    fn check(&self, applicant: &Applicant) -> GateOutcome {
        let flags = &applicant.compliance;
        if flags.all_clear() {
            return GateOutcome::Pass;
        }

        let details: Details = flags
            .entries()
            .into_iter()
            .map(|(name, ok)| (name.to_string(), Value::Bool(ok)))
            .collect();

        GateOutcome::Fail {
            reason: format!(
                "Compliance check failed: complete KYC / payslips / fraud / bank relation / address verification (unmet: {}).",
                flags.unmet().join(", ")
            ),
            details,
        }
    }
}
