//! Bulk evaluation of applicants from tabular files.
//!
//! Rows are read from CSV into applicants, evaluated in parallel against a
//! shared engine, and written back out as flattened CSV or JSON. Rows that
//! cannot be coerced into an applicant are skipped and reported; they never
//! abort the batch.
//!
//! # Example
//!
//! ```
//! use loan_engine::batch::{evaluate_all, read_applicants};
//! use loan_engine::calculation::DecisionEngine;
//! use loan_engine::config::ConfigLoader;
//! use rust_decimal::Decimal;
//!
//! let csv = "name,applicant_type,age,gross_monthly_income,cibil_score\n\
//!            Asha,salaried,34,60000,780\n\
//!            Bad,salaried,not-a-number,1,1\n";
//! let outcome = read_applicants(csv.as_bytes())?;
//! assert_eq!(outcome.applicants.len(), 1);
//! assert_eq!(outcome.skipped[0].row, 2);
//!
//! let engine = DecisionEngine::new(ConfigLoader::builtin()?.into_config());
//! let decisions = evaluate_all(&engine, &outcome.applicants, Decimal::new(1015, 2), 2);
//! assert_eq!(decisions.len(), 1);
//! # Ok::<(), loan_engine::error::EngineError>(())
//! ```

mod export;
mod record;

pub use export::{RESULT_COLUMNS, flatten, write_results_csv, write_results_json};
pub use record::ApplicantRecord;

use std::fs::File;
use std::io::{Read, Write};
use std::panic;
use std::path::Path;
use std::thread;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculation::DecisionEngine;
use crate::error::{EngineError, EngineResult};
use crate::models::{Applicant, Decision};

/// A row that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// One-based data row number (header excluded).
    pub row: usize,
    /// Why the row was skipped.
    pub message: String,
}

/// The result of reading an import file.
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    /// Applicants that imported cleanly, in file order.
    pub applicants: Vec<Applicant>,
    /// Rows that were skipped.
    pub skipped: Vec<SkippedRow>,
}

/// Counts reported at the end of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Data rows read from the input.
    pub rows_read: usize,
    /// Applicants evaluated.
    pub evaluated: usize,
    /// Rows skipped at import.
    pub skipped: usize,
    /// Decisions marked eligible.
    pub sanctioned: usize,
}

impl BatchSummary {
    /// Summarizes an import and the decisions made on it.
    pub fn new(outcome: &ImportOutcome, decisions: &[Decision]) -> Self {
        Self {
            rows_read: outcome.applicants.len() + outcome.skipped.len(),
            evaluated: decisions.len(),
            skipped: outcome.skipped.len(),
            sanctioned: decisions.iter().filter(|d| d.eligible).count(),
        }
    }
}

/// Reads applicants from CSV.
///
/// Cells are trimmed and empty cells are treated as absent. Rows that fail
/// coercion are skipped with a warning; only an I/O failure on the
/// underlying reader is returned as an error.
pub fn read_applicants<R: Read>(reader: R) -> EngineResult<ImportOutcome> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut outcome = ImportOutcome::default();

    for (index, result) in csv_reader.deserialize::<ApplicantRecord>().enumerate() {
        let row = index + 1;
        let converted = match result {
            Ok(record) => record.into_applicant(row),
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => Err(EngineError::InvalidRecord {
                row,
                message: err.to_string(),
            }),
        };

        match converted {
            Ok(applicant) => outcome.applicants.push(applicant),
            Err(err) => {
                warn!(row, error = %err, "skipping import row");
                let message = match err {
                    EngineError::InvalidRecord { message, .. } => message,
                    other => other.to_string(),
                };
                outcome.skipped.push(SkippedRow { row, message });
            }
        }
    }

    Ok(outcome)
}

/// Reads applicants from a CSV file on disk.
pub fn read_applicants_from_path<P: AsRef<Path>>(path: P) -> EngineResult<ImportOutcome> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| EngineError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    read_applicants(file)
}

/// Evaluates every applicant at the same reference rate.
///
/// The batch is split into contiguous chunks, one per worker thread. The
/// engine is shared read-only, and decisions are returned in input order.
pub fn evaluate_all(
    engine: &DecisionEngine,
    applicants: &[Applicant],
    base_rate: Decimal,
    workers: usize,
) -> Vec<Decision> {
    let workers = workers.max(1);
    if workers == 1 || applicants.len() < 2 {
        return applicants
            .iter()
            .map(|applicant| engine.evaluate(applicant, base_rate))
            .collect();
    }

    let chunk_size = applicants.len().div_ceil(workers);
    debug!(
        applicants = applicants.len(),
        workers, chunk_size, "evaluating batch"
    );

    thread::scope(|scope| {
        let handles: Vec<_> = applicants
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|applicant| engine.evaluate(applicant, base_rate))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(decisions) => decisions,
                Err(payload) => panic::resume_unwind(payload),
            })
            .collect()
    })
}

/// Writes the CSV header and template row for an import file.
pub fn write_sample_csv<W: Write>(writer: W) -> EngineResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.serialize(ApplicantRecord::sample())?;
    csv_writer.flush().map_err(|e| EngineError::Io {
        path: "<csv output>".to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::models::ApplicantType;

    fn engine() -> DecisionEngine {
        DecisionEngine::new(ConfigLoader::builtin().unwrap().into_config())
    }

    const HEADER: &str = "name,applicant_type,age,gross_monthly_income,gross_annual_income,cibil_score,salary_account_with_bom,category,proposed_loan_amount";

    #[test]
    fn test_read_skips_bad_rows_and_keeps_order() {
        let csv = format!(
            "{HEADER}\n\
             A,salaried,30,50000,,760,yes,B,300000\n\
             B,salaried,,50000,,760,yes,B,300000\n\
             C,professional,45,,1800000,780,no,,900000\n\
             D,salaried,30,50000,,760,perhaps,B,300000\n"
        );
        let outcome = read_applicants(csv.as_bytes()).unwrap();

        let names: Vec<_> = outcome.applicants.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped[0].row, 2);
        assert!(outcome.skipped[0].message.contains("age"));
        assert_eq!(outcome.skipped[1].row, 4);
        assert!(outcome.applicants[0].salary_account_with_bank);
        assert_eq!(outcome.applicants[1].applicant_type, ApplicantType::Professional);
    }

    #[test]
    fn test_short_row_is_skipped() {
        let csv = format!("{HEADER}\nA,salaried\nB,salaried,30,50000,,760,yes,B,300000\n");
        let outcome = read_applicants(csv.as_bytes()).unwrap();
        assert_eq!(outcome.applicants.len(), 1);
        assert_eq!(outcome.skipped[0].row, 1);
    }

    #[test]
    fn test_compliance_columns_optional() {
        let csv = "age,kyc_ok\n30,yes\n";
        let outcome = read_applicants(csv.as_bytes()).unwrap();
        assert!(outcome.applicants[0].compliance.kyc_ok);
        assert!(!outcome.applicants[0].visit.verified);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let engine = engine();
        let applicants: Vec<Applicant> = (0..37)
            .map(|i| {
                let mut a = Applicant::new(format!("a{i}"), ApplicantType::Salaried, 22 + i % 40);
                a.cibil_score = Some(690 + (i * 7) % 150);
                a.gross_monthly_income = Some(Decimal::from(20000 + i * 1500));
                a
            })
            .collect();
        let rate = Decimal::new(1015, 2);

        let sequential = evaluate_all(&engine, &applicants, rate, 1);
        let parallel = evaluate_all(&engine, &applicants, rate, 4);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_extreme_rows_do_not_abort_batch() {
        let csv = "name,applicant_type,age,gross_monthly_income,cibil_score,proposed_loan_amount\n\
                   Tiny,salaried,34,0.0000000000000000000000000001,760,1000000\n\
                   Huge,salaried,34,79228162514264337593543950335,760,79228162514264337593543950335\n\
                   Plain,salaried,34,60000,760,800000\n";
        let outcome = read_applicants(csv.as_bytes()).unwrap();
        assert_eq!(outcome.applicants.len(), 3);

        let decisions = evaluate_all(&engine(), &outcome.applicants, Decimal::new(1015, 2), 2);
        assert_eq!(decisions.len(), 3);
        assert_eq!(decisions[0].decided_by, "deduction_norm");
        assert_eq!(decisions[1].recommended_loan, Decimal::new(2_000_000, 0));
        assert_eq!(decisions[2].decided_by, "grade_outcome");
    }

    #[test]
    fn test_empty_batch() {
        assert!(evaluate_all(&engine(), &[], Decimal::ONE, 8).is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let engine = engine();
        let csv = "name,age,gross_monthly_income,cibil_score\nA,30,60000,800\nB,70,60000,800\nC,,1,1\n";
        let outcome = read_applicants(csv.as_bytes()).unwrap();
        let decisions = evaluate_all(&engine, &outcome.applicants, Decimal::new(1015, 2), 2);
        let summary = BatchSummary::new(&outcome, &decisions);

        assert_eq!(summary.rows_read, 3);
        assert_eq!(summary.evaluated, 2);
        assert_eq!(summary.skipped, 1);
        assert!(summary.sanctioned <= 1);
    }

    #[test]
    fn test_sample_round_trips_through_reader() {
        let mut out = Vec::new();
        write_sample_csv(&mut out).unwrap();
        let outcome = read_applicants(out.as_slice()).unwrap();
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.applicants[0].name, "Rahul Sharma");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        match read_applicants_from_path("/nonexistent/applicants.csv") {
            Err(EngineError::Io { path, .. }) => assert!(path.ends_with("applicants.csv")),
            other => panic!("Expected Io error, got {:?}", other.map(|o| o.applicants.len())),
        }
    }
}
