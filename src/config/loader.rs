//! Policy loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading policy
//! tables from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EligibilityConfig, PolicyConfig, PolicyMetadata, RatesConfig, ScoringConfig};

const BUILTIN_POLICY: &str = include_str!("../../config/personal_loan/policy.yaml");
const BUILTIN_SCORING: &str = include_str!("../../config/personal_loan/scoring.yaml");
const BUILTIN_RATES: &str = include_str!("../../config/personal_loan/rates.yaml");
const BUILTIN_ELIGIBILITY: &str = include_str!("../../config/personal_loan/eligibility.yaml");

/// Loads and provides access to a lending policy.
///
/// The `ConfigLoader` reads YAML policy files from a directory and
/// validates them into an immutable [`PolicyConfig`].
///
/// # Directory Structure
///
/// ```text
/// config/personal_loan/
/// ├── policy.yaml       # Policy metadata and default reference rate
/// ├── scoring.yaml      # Score tables and grade scale
/// ├── rates.yaml        # Rate spread tables
/// └── eligibility.yaml  # Gates, income multiples, tenures, deduction norms
/// ```
///
/// # Example
///
/// ```no_run
/// use loan_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/personal_loan").unwrap();
/// println!("Policy: {}", loader.metadata().name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PolicyConfig,
}

impl ConfigLoader {
    /// Loads the policy from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any table breaks its structural rules
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<PolicyMetadata>(&path.join("policy.yaml"))?;
        let scoring = Self::load_yaml::<ScoringConfig>(&path.join("scoring.yaml"))?;
        let rates = Self::load_yaml::<RatesConfig>(&path.join("rates.yaml"))?;
        let eligibility = Self::load_yaml::<EligibilityConfig>(&path.join("eligibility.yaml"))?;

        let config = PolicyConfig::new(metadata, scoring, rates, eligibility)?;
        Ok(Self { config })
    }

    /// Loads the policy compiled into the crate.
    ///
    /// These are the same files shipped under `config/personal_loan`.
    ///
    /// # Example
    ///
    /// ```
    /// use loan_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::builtin()?;
    /// assert_eq!(loader.config().eligibility().cibil_cutoff, 700);
    /// # Ok::<(), loan_engine::error::EngineError>(())
    /// ```
    pub fn builtin() -> EngineResult<Self> {
        let metadata = Self::parse_yaml::<PolicyMetadata>("builtin:policy.yaml", BUILTIN_POLICY)?;
        let scoring = Self::parse_yaml::<ScoringConfig>("builtin:scoring.yaml", BUILTIN_SCORING)?;
        let rates = Self::parse_yaml::<RatesConfig>("builtin:rates.yaml", BUILTIN_RATES)?;
        let eligibility =
            Self::parse_yaml::<EligibilityConfig>("builtin:eligibility.yaml", BUILTIN_ELIGIBILITY)?;

        let config = PolicyConfig::new(metadata, scoring, rates, eligibility)?;
        Ok(Self { config })
    }

    /// Loads from `path` when given, otherwise the built-in policy.
    pub fn load_or_builtin<P: AsRef<Path>>(path: Option<P>) -> EngineResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse_yaml(&path_str, &content)
    }

    fn parse_yaml<T: serde::de::DeserializeOwned>(origin: &str, content: &str) -> EngineResult<T> {
        serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Returns the loaded policy.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Consumes the loader, returning the policy.
    pub fn into_config(self) -> PolicyConfig {
        self.config
    }

    /// Returns the policy metadata.
    pub fn metadata(&self) -> &PolicyMetadata {
        self.config.metadata()
    }
}
