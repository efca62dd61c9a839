use super::config::ScoringConfig;
use crate::roommates::preferences::{Answer, SCALE_MAX, SCALE_MIN};

const SCALE_SPAN: f64 = (SCALE_MAX - SCALE_MIN) as f64;

/// Per-factor compatibility in `[0, 1]` for two answers to the same question.
///
/// Every branch is symmetric in its arguments.
pub(crate) fn factor_compatibility(a: &Answer, b: &Answer, config: &ScoringConfig) -> f64 {
    match (a, b) {
        (Answer::Multi(left), Answer::Multi(right)) => {
            // Any shared deal breaker costs the same, however many overlap.
            if left.intersection(right).next().is_some() {
                config.deal_breaker_conflict
            } else {
                1.0
            }
        }
        (Answer::Scale(left), Answer::Scale(right)) => {
            let distance = f64::from(left.abs_diff(*right));
            (1.0 - distance / SCALE_SPAN).max(0.0)
        }
        (left, right) => {
            if left == right {
                1.0
            } else {
                config.categorical_mismatch
            }
        }
    }
}
