//! Policy configuration for the loan decision engine.
//!
//! This module loads the lending policy (score tables, rate spreads,
//! eligibility gates and loan sizing rules) from YAML files into an
//! immutable [`PolicyConfig`] that is passed explicitly to the scorer, the
//! rate resolver and the decision engine.
//!
//! # Example
//!
//! ```no_run
//! use loan_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/personal_loan").unwrap();
//! println!("Loaded policy: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AgeBand, Band, BandTable, CategoryTable, CommonScoring, DeductionNorms, EligibilityConfig,
    GradeScale, PolicyConfig, PolicyMetadata, ProfessionalScoring, ProfessionalSpreads,
    RatesConfig, SalariedScoring, SalariedSpread, SalariedSpreads, ScoringConfig, TenureConfig,
};
