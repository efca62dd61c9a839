mod config;
mod rules;

pub use config::{ScoringConfig, WeightTableError, WeightedFactor};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::preferences::{OwnerId, PreferenceRecord};

/// Absorbs binary representation error so exact halves such as `57.5` round up.
const ROUNDING_TOLERANCE: f64 = 1e-9;

/// Qualitative bucket derived from a numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl CompatibilityBand {
    pub const fn from_score(score: u8) -> Self {
        if score >= 90 {
            CompatibilityBand::Excellent
        } else if score >= 70 {
            CompatibilityBand::Good
        } else if score >= 50 {
            CompatibilityBand::Fair
        } else {
            CompatibilityBand::Poor
        }
    }

    pub const fn ordered() -> [CompatibilityBand; 4] {
        [
            CompatibilityBand::Excellent,
            CompatibilityBand::Good,
            CompatibilityBand::Fair,
            CompatibilityBand::Poor,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            CompatibilityBand::Excellent => "excellent",
            CompatibilityBand::Good => "good",
            CompatibilityBand::Fair => "fair",
            CompatibilityBand::Poor => "poor",
        }
    }
}

/// One side of a comparison. A missing record compares as an empty answer set.
#[derive(Debug, Clone, Copy)]
pub struct Participant<'a> {
    pub id: &'a OwnerId,
    pub record: Option<&'a PreferenceRecord>,
}

impl<'a> Participant<'a> {
    pub fn new(id: &'a OwnerId, record: Option<&'a PreferenceRecord>) -> Self {
        Self { id, record }
    }
}

impl<'a> From<&'a PreferenceRecord> for Participant<'a> {
    fn from(record: &'a PreferenceRecord) -> Self {
        Self {
            id: record.owner_id(),
            record: Some(record),
        }
    }
}

/// Pairwise outcome with the per-factor values that fed the score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityResult {
    pub viewer_id: OwnerId,
    pub candidate_id: OwnerId,
    pub score: u8,
    pub band: CompatibilityBand,
    pub contributions: BTreeMap<String, f64>,
}

/// Stateless scorer applying a weight table to two preference records.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityScorer {
    config: ScoringConfig,
}

impl CompatibilityScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn factors(&self) -> &[WeightedFactor] {
        &self.config.factors
    }

    /// Score two participants. Total and symmetric; never fails.
    pub fn score(&self, viewer: Participant<'_>, candidate: Participant<'_>) -> CompatibilityResult {
        let mut contributions = BTreeMap::new();
        let mut weighted_sum = 0.0;
        let mut weighted_total = 0.0;

        if let (Some(left), Some(right)) = (viewer.record, candidate.record) {
            for factor in &self.config.factors {
                let (Some(a), Some(b)) = (
                    left.answer(&factor.factor_id),
                    right.answer(&factor.factor_id),
                ) else {
                    continue;
                };

                let compatibility = rules::factor_compatibility(a, b, &self.config);
                weighted_sum += compatibility * factor.weight;
                weighted_total += factor.weight;
                contributions.insert(factor.factor_id.clone(), compatibility);
            }
        }

        let score = if weighted_total > 0.0 {
            percent_half_up(weighted_sum, weighted_total)
        } else {
            self.config.neutral_score
        };

        CompatibilityResult {
            viewer_id: viewer.id.clone(),
            candidate_id: candidate.id.clone(),
            score,
            band: CompatibilityBand::from_score(score),
            contributions,
        }
    }

    pub fn compare(&self, viewer: &PreferenceRecord, candidate: &PreferenceRecord) -> CompatibilityResult {
        self.score(viewer.into(), candidate.into())
    }
}

fn percent_half_up(weighted_sum: f64, weighted_total: f64) -> u8 {
    (100.0 * weighted_sum / weighted_total + ROUNDING_TOLERANCE)
        .round()
        .clamp(0.0, 100.0) as u8
}
