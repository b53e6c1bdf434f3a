//! Flattened result rows for CSV and JSON output.

use std::collections::BTreeSet;
use std::io::Write;

use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult};
use crate::models::{Applicant, Decision};

/// Columns written for every row, ahead of the merged details.
pub const RESULT_COLUMNS: [&str; 11] = [
    "name",
    "applicant_type",
    "score",
    "grade",
    "eligible",
    "reason",
    "decided_by",
    "recommended_loan",
    "tenure_months",
    "annual_rate_percent",
    "emi",
];

/// One applicant's decision flattened into a single JSON object.
///
/// Detail keys that collide with a fixed column are dropped.
pub fn flatten(applicant: &Applicant, decision: &Decision) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert("name".into(), Value::String(applicant.name.clone()));
    row.insert(
        "applicant_type".into(),
        Value::String(applicant.applicant_type.to_string()),
    );
    row.insert(
        "score".into(),
        decision
            .score
            .map_or(Value::Null, |s| Value::String(s.to_string())),
    );
    row.insert(
        "grade".into(),
        decision.grade.map_or(Value::Null, Value::from),
    );
    row.insert("eligible".into(), Value::Bool(decision.eligible));
    row.insert("reason".into(), Value::String(decision.reason.clone()));
    row.insert("decided_by".into(), Value::String(decision.decided_by.clone()));
    row.insert(
        "recommended_loan".into(),
        Value::String(decision.recommended_loan.to_string()),
    );
    row.insert("tenure_months".into(), Value::from(decision.tenure_months));
    row.insert(
        "annual_rate_percent".into(),
        Value::String(decision.annual_rate_percent.to_string()),
    );
    row.insert("emi".into(), Value::String(decision.emi.to_string()));

    for (key, value) in &decision.details {
        if !RESULT_COLUMNS.contains(&key.as_str()) {
            row.insert(key.clone(), value.clone());
        }
    }
    row
}

/// Writes results as CSV: the fixed columns, then every detail key that
/// appears in any row, in sorted order. Missing cells are left empty.
pub fn write_results_csv<W: Write>(
    writer: W,
    applicants: &[Applicant],
    decisions: &[Decision],
) -> EngineResult<()> {
    let rows: Vec<_> = applicants
        .iter()
        .zip(decisions)
        .map(|(applicant, decision)| flatten(applicant, decision))
        .collect();

    let detail_columns: BTreeSet<&str> = decisions
        .iter()
        .flat_map(|d| d.details.keys())
        .map(String::as_str)
        .filter(|key| !RESULT_COLUMNS.contains(key))
        .collect();
    let header: Vec<&str> = RESULT_COLUMNS
        .iter()
        .copied()
        .chain(detail_columns.iter().copied())
        .collect();

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&header)?;
    for row in &rows {
        let record: Vec<String> = header
            .iter()
            .map(|column| row.get(*column).map(cell_text).unwrap_or_default())
            .collect();
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush().map_err(|e| EngineError::Io {
        path: "<csv output>".to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

/// Writes results as a pretty-printed JSON array of flattened rows.
pub fn write_results_json<W: Write>(
    writer: W,
    applicants: &[Applicant],
    decisions: &[Decision],
) -> EngineResult<()> {
    let rows: Vec<Value> = applicants
        .iter()
        .zip(decisions)
        .map(|(applicant, decision)| Value::Object(flatten(applicant, decision)))
        .collect();

    serde_json::to_writer_pretty(writer, &rows).map_err(|e| EngineError::Io {
        path: "<json output>".to_string(),
        message: e.to_string(),
    })
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
