//! Error types for the loan decision engine.
//!
//! Policy rejections are not errors: a well-formed applicant that fails a
//! gate produces an ineligible [`Decision`](crate::models::Decision). The
//! variants here cover policy loading, bulk import and file I/O.

use thiserror::Error;

/// The main error type for the loan decision engine.
///
/// # Example
///
/// ```
/// use loan_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/scoring.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/scoring.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A policy table parsed but breaks a structural rule.
    #[error("Invalid policy table '{table}': {message}")]
    InvalidPolicy {
        /// Name of the offending table.
        table: String,
        /// What is wrong with it.
        message: String,
    },

    /// A bulk-import row could not be coerced into an applicant.
    #[error("Invalid record at row {row}: {message}")]
    InvalidRecord {
        /// One-based data row number (header excluded).
        row: usize,
        /// A description of the coercion failure.
        message: String,
    },

    /// Reading or writing a batch file failed.
    #[error("I/O error on '{path}': {message}")]
    Io {
        /// The file involved.
        path: String,
        /// The underlying error message.
        message: String,
    },

    /// The CSV stream itself is unreadable or unwritable.
    #[error("CSV error: {message}")]
    Csv {
        /// The underlying error message.
        message: String,
    },
}

impl From<csv::Error> for EngineError {
    fn from(err: csv::Error) -> Self {
        EngineError::Csv {
            message: err.to_string(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
