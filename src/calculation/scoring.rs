//! Composite credit scoring.
//!
//! This module provides the [`Scorer`], which maps an applicant to a
//! [`ScoreCard`] using the formula for its applicant type, and the shared
//! builder both formulas record their contributions through.

use std::hash::Hash;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::{BandTable, CategoryTable, CommonScoring, ScoringConfig};
use crate::models::{Applicant, ApplicantType, ScoreCard, ScoreContribution};

use super::professional_score::score_professional;
use super::salaried_score::score_salaried;

/// Scores applicants against one policy's scoring tables.
///
/// # Example
///
/// ```
/// use loan_engine::calculation::Scorer;
/// use loan_engine::config::ConfigLoader;
/// use loan_engine::models::{Applicant, ApplicantType};
///
/// let loader = ConfigLoader::builtin()?;
/// let scorer = Scorer::new(loader.config().scoring());
///
/// let applicant = Applicant::new("Asha", ApplicantType::Salaried, 34);
/// let card = scorer.score(&applicant).unwrap();
/// assert!((1..=5).contains(&card.grade));
/// # Ok::<(), loan_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Scorer<'a> {
    config: &'a ScoringConfig,
}

impl<'a> Scorer<'a> {
    /// Creates a scorer over the given tables.
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    /// Scores an applicant with the formula for its type.
    ///
    /// Returns `None` for an unrecognized applicant type, which has no formula.
    pub fn score(&self, applicant: &Applicant) -> Option<ScoreCard> {
        match applicant.applicant_type {
            ApplicantType::Salaried => Some(score_salaried(applicant, self.config)),
            ApplicantType::Professional => Some(score_professional(applicant, self.config)),
            ApplicantType::Unrecognized(_) => None,
        }
    }

    /// Maps a composite score to its grade.
    pub fn grade(&self, score: Decimal) -> u8 {
        self.config.grades.grade(score)
    }
}

/// Collects contributions in scoring order.
#[derive(Debug, Default)]
pub(super) struct CardBuilder {
    contributions: Vec<ScoreContribution>,
}

impl CardBuilder {
    pub(super) fn fixed(&mut self, dimension: &str, input: impl ToString, points: Decimal) {
        self.contributions.push(ScoreContribution {
            dimension: dimension.to_string(),
            input: input.to_string(),
            points,
        });
    }

    pub(super) fn band(&mut self, dimension: &str, table: &BandTable, value: Decimal) {
        self.fixed(dimension, value.normalize(), table.points(value));
    }

    pub(super) fn category<K>(&mut self, dimension: &str, table: &CategoryTable<K>, key: Option<K>)
    where
        K: Copy + Eq + Hash + Serialize,
    {
        self.fixed(dimension, label(&table.resolve(key)), table.points(key));
    }

    /// Average balance, bureau score and credit history close both formulas.
    pub(super) fn bureau_dimensions(&mut self, applicant: &Applicant, common: &CommonScoring) {
        self.band(
            "avg_balance_ratio",
            &common.avg_balance_ratio,
            applicant
                .avg_balance_to_emi_ratio_percent
                .unwrap_or(Decimal::ZERO),
        );
        self.band(
            "cibil",
            &common.cibil,
            Decimal::from(applicant.cibil_score.unwrap_or(0)),
        );
        self.category(
            "credit_history",
            &common.credit_history,
            applicant.credit_history_score_choice,
        );
    }

    pub(super) fn finish(self, config: &ScoringConfig) -> ScoreCard {
        let raw_total = self
            .contributions
            .iter()
            .fold(Decimal::ZERO, |total, c| total.saturating_add(c.points));
        let score = raw_total.min(config.max_score).max(Decimal::ZERO);
        ScoreCard {
            contributions: self.contributions,
            raw_total,
            score,
            grade: config.grades.grade(score),
        }
    }
}

/// The wire name of a categorical value.
fn label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::models::{CreditHistory, MaritalStatus};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_unrecognized_type_has_no_formula() {
        let loader = ConfigLoader::builtin().unwrap();
        let scorer = Scorer::new(loader.config().scoring());
        let applicant = Applicant::new("x", ApplicantType::from("pensioner".to_string()), 40);
        assert!(scorer.score(&applicant).is_none());
    }

    #[test]
    fn test_label_uses_wire_names() {
        assert_eq!(label(&MaritalStatus::Married), "married");
        assert_eq!(label(&CreditHistory::Best36Months), "best_36m");
    }

    #[test]
    fn test_finish_caps_at_max_score() {
        let loader = ConfigLoader::builtin().unwrap();
        let config = loader.config().scoring();
        let mut builder = CardBuilder::default();
        builder.fixed("a", "x", dec("70"));
        builder.fixed("b", "y", dec("45"));
        let card = builder.finish(config);

        assert_eq!(card.raw_total, dec("115"));
        assert_eq!(card.score, dec("100"));
        assert_eq!(card.grade, 1);
    }

    #[test]
    fn test_grade_mapping() {
        let loader = ConfigLoader::builtin().unwrap();
        let scorer = Scorer::new(loader.config().scoring());
        assert_eq!(scorer.grade(dec("80.5")), 1);
        assert_eq!(scorer.grade(dec("80")), 2);
        assert_eq!(scorer.grade(dec("70")), 3);
        assert_eq!(scorer.grade(dec("50")), 4);
        assert_eq!(scorer.grade(dec("49.5")), 5);
    }
}
