use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::roommates::questionnaire::Questionnaire;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// One scored dimension and its share of the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedFactor {
    pub factor_id: String,
    pub weight: f64,
}

impl WeightedFactor {
    pub fn new(factor_id: impl Into<String>, weight: f64) -> Self {
        Self {
            factor_id: factor_id.into(),
            weight,
        }
    }
}

/// Tunable scoring configuration: the weight table plus the per-factor constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub factors: Vec<WeightedFactor>,
    #[serde(default = "default_conflict_compatibility")]
    pub deal_breaker_conflict: f64,
    #[serde(default = "default_categorical_mismatch")]
    pub categorical_mismatch: f64,
    #[serde(default = "default_neutral_score")]
    pub neutral_score: u8,
}

fn default_conflict_compatibility() -> f64 {
    0.3
}

fn default_categorical_mismatch() -> f64 {
    0.5
}

fn default_neutral_score() -> u8 {
    50
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            factors: vec![
                WeightedFactor::new("cleanliness", 0.20),
                WeightedFactor::new("noise_level", 0.15),
                WeightedFactor::new("social_level", 0.10),
                WeightedFactor::new("sleep_schedule", 0.15),
                WeightedFactor::new("study_habits", 0.10),
                WeightedFactor::new("cooking_habits", 0.05),
                WeightedFactor::new("sharing_comfort", 0.05),
                WeightedFactor::new("pet_preference", 0.10),
                WeightedFactor::new("deal_breakers", 0.10),
            ],
            deal_breaker_conflict: default_conflict_compatibility(),
            categorical_mismatch: default_categorical_mismatch(),
            neutral_score: default_neutral_score(),
        }
    }
}

impl ScoringConfig {
    pub fn with_factors(factors: Vec<WeightedFactor>) -> Self {
        Self {
            factors,
            ..Self::default()
        }
    }

    /// Load a JSON weight table, e.g. `{"factors": [{"factor_id": "cleanliness", "weight": 1.0}]}`.
    pub fn from_json_str(raw: &str) -> Result<Self, WeightTableError> {
        serde_json::from_str(raw).map_err(WeightTableError::Parse)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, WeightTableError> {
        let raw = std::fs::read_to_string(path).map_err(WeightTableError::Io)?;
        Self::from_json_str(&raw)
    }

    pub fn factor_ids(&self) -> impl Iterator<Item = &str> {
        self.factors.iter().map(|factor| factor.factor_id.as_str())
    }

    /// Check the table against the questionnaire it will score.
    pub fn validate(&self, questionnaire: &Questionnaire) -> Result<(), WeightTableError> {
        if self.factors.is_empty() {
            return Err(WeightTableError::Empty);
        }

        let mut seen = HashSet::new();
        for factor in &self.factors {
            if !seen.insert(factor.factor_id.as_str()) {
                return Err(WeightTableError::DuplicateFactor(factor.factor_id.clone()));
            }
            if !factor.weight.is_finite() || factor.weight < 0.0 {
                return Err(WeightTableError::NegativeWeight {
                    factor_id: factor.factor_id.clone(),
                    weight: factor.weight,
                });
            }
            if questionnaire.question(&factor.factor_id).is_none() {
                return Err(WeightTableError::UnknownFactor(factor.factor_id.clone()));
            }
        }

        let sum: f64 = self.factors.iter().map(|factor| factor.weight).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightTableError::WeightSum(sum));
        }

        for (name, value) in [
            ("deal_breaker_conflict", self.deal_breaker_conflict),
            ("categorical_mismatch", self.categorical_mismatch),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(WeightTableError::CompatibilityOutOfRange { name, value });
            }
        }

        if self.neutral_score > 100 {
            return Err(WeightTableError::NeutralScore(self.neutral_score));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WeightTableError {
    #[error("weight table has no factors")]
    Empty,
    #[error("factor '{0}' listed more than once")]
    DuplicateFactor(String),
    #[error("factor '{factor_id}' has invalid weight {weight}")]
    NegativeWeight { factor_id: String, weight: f64 },
    #[error("factor '{0}' does not match any questionnaire question")]
    UnknownFactor(String),
    #[error("weights must sum to 1.0, got {0:.6}")]
    WeightSum(f64),
    #[error("{name} must be within [0, 1], got {value}")]
    CompatibilityOutOfRange { name: &'static str, value: f64 },
    #[error("neutral score must be within [0, 100], got {0}")]
    NeutralScore(u8),
    #[error("unable to read weight table: {0}")]
    Io(#[source] std::io::Error),
    #[error("invalid weight table JSON: {0}")]
    Parse(#[source] serde_json::Error),
}
