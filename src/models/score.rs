//! Score card model.
//!
//! A [`ScoreCard`] records the points awarded on each policy dimension so
//! that every contribution to the composite score can be inspected.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Points awarded on one scoring dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreContribution {
    /// Dimension name (e.g. "cibil", "emi_nmi_ratio").
    pub dimension: String,
    /// The value looked up, after defaults were applied.
    pub input: String,
    /// Points awarded.
    pub points: Decimal,
}

/// The result of scoring an applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Per-dimension contributions, in scoring order.
    pub contributions: Vec<ScoreContribution>,
    /// Sum of all contributions before the cap.
    pub raw_total: Decimal,
    /// Composite score after the cap.
    pub score: Decimal,
    /// Risk grade, 1 (strongest) to 5.
    pub grade: u8,
}

impl ScoreCard {
    /// Points awarded on a dimension, if it was scored.
    pub fn points_for(&self, dimension: &str) -> Option<Decimal> {
        self.contributions
            .iter()
            .find(|c| c.dimension == dimension)
            .map(|c| c.points)
    }
}
