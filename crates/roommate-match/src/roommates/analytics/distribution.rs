use std::collections::BTreeMap;

use serde::Serialize;

use crate::roommates::scoring::{CompatibilityBand, CompatibilityResult, WeightedFactor};

pub const TOP_FACTOR_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub factor_id: String,
    pub average_contribution_percent: f64,
}

/// Summary of a scored candidate set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDistribution {
    pub total_count: usize,
    pub average_score: u8,
    pub band_counts: BTreeMap<CompatibilityBand, usize>,
    pub top_factors: Vec<FactorContribution>,
}

impl MatchDistribution {
    pub fn band_count(&self, band: CompatibilityBand) -> usize {
        self.band_counts.get(&band).copied().unwrap_or_default()
    }
}

pub fn summarize<'a, I>(results: I, factors: &[WeightedFactor]) -> MatchDistribution
where
    I: IntoIterator<Item = &'a CompatibilityResult>,
{
    let mut band_counts: BTreeMap<CompatibilityBand, usize> = CompatibilityBand::ordered()
        .into_iter()
        .map(|band| (band, 0))
        .collect();
    let mut factor_totals: Vec<(f64, usize)> = vec![(0.0, 0); factors.len()];
    let mut total_count = 0_usize;
    let mut score_sum = 0_u64;

    for result in results {
        total_count += 1;
        score_sum += u64::from(result.score);
        *band_counts.entry(result.band).or_default() += 1;

        for (factor, totals) in factors.iter().zip(factor_totals.iter_mut()) {
            if let Some(value) = result.contributions.get(&factor.factor_id) {
                totals.0 += value;
                totals.1 += 1;
            }
        }
    }

    let mut means: Vec<(&WeightedFactor, f64)> = factors
        .iter()
        .zip(factor_totals)
        .map(|(factor, (sum, present))| {
            let mean = if present > 0 { sum / present as f64 } else { 0.0 };
            (factor, mean)
        })
        .collect();

    // Stable sort keeps table order among equal averages.
    means.sort_by(|left, right| right.1.total_cmp(&left.1));
    let top_factors = means
        .into_iter()
        .take(TOP_FACTOR_LIMIT)
        .map(|(factor, mean)| FactorContribution {
            factor_id: factor.factor_id.clone(),
            average_contribution_percent: round_tenth(mean * 100.0),
        })
        .collect();

    MatchDistribution {
        total_count,
        average_score: average_half_up(score_sum, total_count),
        band_counts,
        top_factors,
    }
}

fn average_half_up(sum: u64, count: usize) -> u8 {
    if count == 0 {
        return 0;
    }
    let count = count as u64;
    ((sum * 2 + count) / (count * 2)).min(100) as u8
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
