use serde::Serialize;

use super::distribution::MatchDistribution;
use crate::roommates::scoring::CompatibilityBand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolHealth {
    Strong,
    Mixed,
    Thin,
    Empty,
}

/// Human-readable commentary derived from a distribution.
#[derive(Debug, Clone, Serialize)]
pub struct MatchInsights {
    pub pool_health: PoolHealth,
    pub strong_match_share: f64,
    pub observations: Vec<String>,
}

pub(crate) fn generate_insights(distribution: &MatchDistribution) -> MatchInsights {
    let total = distribution.total_count;
    let strong = distribution.band_count(CompatibilityBand::Excellent)
        + distribution.band_count(CompatibilityBand::Good);
    let poor = distribution.band_count(CompatibilityBand::Poor);

    let strong_match_share = if total > 0 {
        strong as f64 / total as f64
    } else {
        0.0
    };

    let pool_health = if total == 0 {
        PoolHealth::Empty
    } else if strong_match_share >= 0.5 {
        PoolHealth::Strong
    } else if strong > 0 {
        PoolHealth::Mixed
    } else {
        PoolHealth::Thin
    };

    let mut observations = Vec::new();
    if total == 0 {
        observations.push("No scored candidates yet".to_string());
    } else {
        observations.push(format!(
            "{strong} of {total} candidate{} score good or better (average {})",
            if total == 1 { "" } else { "s" },
            distribution.average_score
        ));

        if let Some(best) = distribution.top_factors.first() {
            observations.push(format!(
                "Strongest shared factor: {} ({:.0}% average compatibility)",
                best.factor_id, best.average_contribution_percent
            ));
        }

        if poor * 2 > total {
            observations.push(
                "Most candidates score poorly; revisiting deal breakers may widen the pool"
                    .to_string(),
            );
        }
    }

    MatchInsights {
        pool_health,
        strong_match_share,
        observations,
    }
}
