//! Compliance gates evaluated before scoring.
//!
//! A [`ComplianceCheck`] is a prerequisite an application must satisfy
//! before the engine will score it. Checks run in the order they were
//! installed and the first failure ends evaluation.
//!
//! # Example
//!
//! ```
//! use loan_engine::compliance::{ComplianceCheck, DocumentChecklist, GateOutcome};
//! use loan_engine::models::{Applicant, ApplicantType};
//!
//! let applicant = Applicant::new("Asha", ApplicantType::Salaried, 34);
//! let outcome = DocumentChecklist.check(&applicant);
//! assert!(!outcome.passed());
//! ```

mod checklist;
mod visit;

pub use checklist::DocumentChecklist;
pub use visit::PreSanctionVisit;

use crate::models::{Applicant, Details};

/// The result of one compliance check.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// The prerequisite is met.
    Pass,
    /// The prerequisite is not met.
    Fail {
        /// Rejection reason shown to the caller.
        reason: String,
        /// Values the check looked at.
        details: Details,
    },
}

impl GateOutcome {
    /// Returns true for [`GateOutcome::Pass`].
    pub fn passed(&self) -> bool {
        matches!(self, GateOutcome::Pass)
    }
}

/// A prerequisite evaluated before scoring.
///
/// Implementations must be pure functions of the applicant so that
/// evaluation stays deterministic.
pub trait ComplianceCheck: Send + Sync {
    /// Identifier recorded as `decided_by` when the check fails.
    fn rule_id(&self) -> &'static str;

    /// Human-readable name for the audit trace.
    fn rule_name(&self) -> &'static str {
        self.rule_id()
    }

    /// Evaluates the check.
    fn check(&self, applicant: &Applicant) -> GateOutcome;
}

/// The checks installed by the compliance variant, in evaluation order.
pub fn standard_checks() -> Vec<Box<dyn ComplianceCheck>> {
    vec![Box::new(DocumentChecklist), Box::new(PreSanctionVisit)]
}
