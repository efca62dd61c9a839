use std::collections::BTreeMap;

use super::common::*;
use crate::roommates::analytics::{summarize, PoolHealth, TOP_FACTOR_LIMIT};
use crate::roommates::scoring::{
    CompatibilityBand, CompatibilityResult, CompatibilityScorer, ScoringConfig,
};

fn result(candidate: &str, score: u8, contributions: &[(&str, f64)]) -> CompatibilityResult {
    CompatibilityResult {
        viewer_id: owner("viewer"),
        candidate_id: owner(candidate),
        score,
        band: CompatibilityBand::from_score(score),
        contributions: contributions
            .iter()
            .map(|(id, value)| ((*id).to_string(), *value))
            .collect::<BTreeMap<_, _>>(),
    }
}

#[test]
fn distribution_counts_bands_and_rounds_average() {
    let results = vec![
        result("a", 95, &[]),
        result("b", 85, &[]),
        result("c", 65, &[]),
        result("d", 45, &[]),
    ];

    let distribution = summarize(&results, &ScoringConfig::default().factors);

    assert_eq!(distribution.total_count, 4);
    assert_eq!(distribution.average_score, 73);
    assert_eq!(distribution.band_count(CompatibilityBand::Excellent), 1);
    assert_eq!(distribution.band_count(CompatibilityBand::Good), 1);
    assert_eq!(distribution.band_count(CompatibilityBand::Fair), 1);
    assert_eq!(distribution.band_count(CompatibilityBand::Poor), 1);
    assert_eq!(
        distribution.band_counts.values().sum::<usize>(),
        distribution.total_count
    );
}

#[test]
fn empty_input_reports_zeroes_for_every_band() {
    let distribution = summarize(
        &Vec::<CompatibilityResult>::new(),
        &ScoringConfig::default().factors,
    );

    assert_eq!(distribution.total_count, 0);
    assert_eq!(distribution.average_score, 0);
    assert_eq!(distribution.band_counts.len(), 4);
    assert!(distribution.band_counts.values().all(|count| *count == 0));

    let insights = distribution.insights();
    assert_eq!(insights.pool_health, PoolHealth::Empty);
    assert_eq!(insights.strong_match_share, 0.0);
}

#[test]
fn top_factors_average_only_where_present() {
    let results = vec![
        result("a", 90, &[("cleanliness", 1.0), ("noise_level", 0.5)]),
        result("b", 70, &[("cleanliness", 0.5), ("deal_breakers", 0.3)]),
        result("c", 60, &[("sleep_schedule", 0.8)]),
    ];

    let distribution = summarize(&results, &ScoringConfig::default().factors);

    let top: Vec<(&str, f64)> = distribution
        .top_factors
        .iter()
        .map(|factor| (factor.factor_id.as_str(), factor.average_contribution_percent))
        .collect();
    assert_eq!(
        top,
        vec![
            ("sleep_schedule", 80.0),
            ("cleanliness", 75.0),
            ("noise_level", 50.0),
        ]
    );
    assert_eq!(distribution.top_factors.len(), TOP_FACTOR_LIMIT);
}

#[test]
fn equal_factor_averages_keep_table_order() {
    let results = vec![result(
        "a",
        100,
        &[
            ("pet_preference", 1.0),
            ("cleanliness", 1.0),
            ("noise_level", 1.0),
            ("social_level", 1.0),
        ],
    )];

    let distribution = summarize(&results, &ScoringConfig::default().factors);

    let ids: Vec<&str> = distribution
        .top_factors
        .iter()
        .map(|factor| factor.factor_id.as_str())
        .collect();
    assert_eq!(ids, vec!["cleanliness", "noise_level", "social_level"]);
}

#[test]
fn summarizes_scored_pool_end_to_end() {
    let scorer = CompatibilityScorer::new(ladder_config());
    let viewer = ladder_viewer();
    let pool = ladder_pool(&[95, 85, 65, 45]);

    let results = crate::roommates::ranking::score_pool(
        &scorer,
        viewer.owner_id(),
        Some(&viewer),
        &pool,
    );
    let distribution = summarize(&results, scorer.factors());

    assert_eq!(distribution.average_score, 73);
    assert_eq!(distribution.top_factors[0].factor_id, "noise_level");
    assert_eq!(distribution.top_factors[0].average_contribution_percent, 81.3);
}

#[test]
fn insights_classify_pool_health() {
    let strong = summarize(
        &vec![result("a", 95, &[]), result("b", 75, &[]), result("c", 40, &[])],
        &ScoringConfig::default().factors,
    )
    .insights();
    assert_eq!(strong.pool_health, PoolHealth::Strong);
    assert!(strong.observations[0].starts_with("2 of 3 candidates"));

    let mixed = summarize(
        &vec![result("a", 75, &[]), result("b", 40, &[]), result("c", 30, &[])],
        &ScoringConfig::default().factors,
    )
    .insights();
    assert_eq!(mixed.pool_health, PoolHealth::Mixed);
    assert!(mixed
        .observations
        .iter()
        .any(|line| line.contains("revisiting deal breakers")));

    let thin = summarize(&vec![result("a", 55, &[])], &ScoringConfig::default().factors)
        .insights();
    assert_eq!(thin.pool_health, PoolHealth::Thin);
}
