//! Core data models for the loan decision engine.
//!
//! This module contains all the domain models used throughout the engine.

mod applicant;
mod decision;
mod rate_quote;
mod score;

pub use applicant::{
    Applicant, ApplicantType, Category, ComplianceFlags, CreditHistory, IncomeTrend,
    MaritalStatus, RepaymentChannel, ResidenceType, VisitReport,
};
pub use decision::{AuditStep, AuditTrace, AuditWarning, Decision, Details};
pub use rate_quote::{CibilSlab, RateQuote, SalaryChannel, SpreadSource};
pub use score::{ScoreCard, ScoreContribution};
