//! Personal Loan Decision Engine
//!
//! This crate scores personal-loan applicants against a bank's lending
//! policy, prices the loan from a bureau-score spread table, and decides
//! whether it can be sanctioned, recording every rule applied along the way.
//!
//! # Example
//!
//! ```
//! use loan_engine::calculation::DecisionEngine;
//! use loan_engine::config::ConfigLoader;
//! use loan_engine::models::{Applicant, ApplicantType};
//! use rust_decimal::Decimal;
//!
//! let policy = ConfigLoader::builtin()?.into_config();
//! let engine = DecisionEngine::new(policy);
//!
//! let mut applicant = Applicant::new("Rahul Sharma", ApplicantType::Salaried, 34);
//! applicant.gross_monthly_income = Some(Decimal::new(60000, 0));
//! applicant.cibil_score = Some(810);
//!
//! let decision = engine.evaluate(&applicant, Decimal::new(1015, 2));
//! assert!(decision.score.is_some());
//! # Ok::<(), loan_engine::error::EngineError>(())
//! ```

#![warn(missing_docs)]

pub mod api;
pub mod batch;
pub mod calculation;
pub mod compliance;
pub mod config;
pub mod error;
pub mod models;
pub mod sanction;
pub mod telemetry;
