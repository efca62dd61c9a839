use std::sync::Arc;

use super::common::*;
use crate::roommates::preferences::{Answer, ValidationError};
use crate::roommates::ranking::{Candidate, PageRequest, RankRequest};
use crate::roommates::repository::{PreferenceStore, StoreError};
use crate::roommates::scoring::{CompatibilityBand, ScoringConfig, WeightTableError, WeightedFactor};
use crate::roommates::service::{
    DistributionScope, MatchingService, MatchingServiceError, PoolOutcome,
};
use crate::roommates::session::{SessionError, Step};

#[test]
fn construction_rejects_invalid_weight_tables() {
    let config = ScoringConfig::with_factors(vec![WeightedFactor::new("cleanliness", 0.4)]);

    match MatchingService::new(
        Arc::new(MemoryStore::default()),
        Arc::new(StaticSource::default()),
        config,
    ) {
        Err(MatchingServiceError::Config(WeightTableError::WeightSum(sum))) => {
            assert!((sum - 0.4).abs() < 1e-9)
        }
        Err(other) => panic!("expected weight sum error, got {other:?}"),
        Ok(_) => panic!("expected weight sum error"),
    }
}

#[test]
fn save_preferences_validates_before_writing() {
    let (service, store, _) = build_service(ScoringConfig::default(), Vec::new(), Vec::new());

    let result = service.save_preferences(
        &owner("u-1"),
        answers(&[("cleanliness", Answer::Scale(0))]),
    );

    assert!(matches!(
        result,
        Err(MatchingServiceError::Validation(ValidationError::ScaleOutOfRange { .. }))
    ));
    assert_eq!(store.len(), 0);
}

#[test]
fn save_preferences_replaces_the_whole_record() {
    let (service, store, _) = build_service(
        ScoringConfig::default(),
        vec![full_record("u-1", &["smoking"])],
        Vec::new(),
    );

    let saved = service
        .save_preferences(&owner("u-1"), answers(&[("noise_level", Answer::Scale(1))]))
        .expect("save");

    assert!(!saved.is_complete());
    let stored = store.get(&owner("u-1")).expect("get").expect("present");
    assert_eq!(stored.answers().len(), 1);
    assert!(stored.answer("cleanliness").is_none());
}

#[test]
fn session_round_trip_through_the_service() {
    let (service, store, _) = build_service(ScoringConfig::default(), Vec::new(), Vec::new());

    let mut session = service.start_session(owner("u-2")).expect("start");
    session
        .answer("sleep_schedule", Answer::choice("early_bird"))
        .expect("valid");
    while session.next() != Step::Completed {}

    let record = service.complete_session(&session).expect("complete");

    assert_eq!(record.owner_id(), &owner("u-2"));
    assert!(store.get(&owner("u-2")).expect("get").is_some());

    let resumed = service.start_session(owner("u-2")).expect("restart");
    assert_eq!(
        resumed.answers().get("sleep_schedule"),
        Some(&Answer::choice("early_bird"))
    );
}

#[test]
fn completing_an_open_session_is_rejected() {
    let (service, _, _) = build_service(ScoringConfig::default(), Vec::new(), Vec::new());
    let session = service.start_session(owner("u-3")).expect("start");

    assert!(matches!(
        service.complete_session(&session),
        Err(MatchingServiceError::Session(SessionError::NotCompleted))
    ));
}

#[test]
fn rank_excludes_the_viewer_and_applies_the_threshold() {
    let viewer = ladder_viewer();
    let mut pool = ladder_pool(&[95, 80, 40]);
    pool.push(Candidate::new(
        viewer.owner_id().clone(),
        timestamp(9),
        Some(viewer.clone()),
    ));
    let (service, _, _) = build_service(ladder_config(), vec![viewer.clone()], pool);

    let page = service
        .rank(viewer.owner_id(), RankRequest::default())
        .expect("rank")
        .available()
        .expect("pool available");

    assert_eq!(page.total_matches, 2);
    assert!(page
        .items
        .iter()
        .all(|item| &item.candidate.id != viewer.owner_id()));
}

#[test]
fn unavailable_pool_is_reported_not_emptied() {
    let store = Arc::new(MemoryStore::seeded(vec![full_record("u-1", &[])]));
    let service = MatchingService::new(store, Arc::new(UnavailableSource), ScoringConfig::default())
        .expect("service");

    let outcome = service
        .rank(&owner("u-1"), RankRequest::default())
        .expect("rank");

    match outcome {
        PoolOutcome::Unavailable { reason } => assert!(reason.contains("timed out")),
        other => panic!("expected unavailable outcome, got {other:?}"),
    }
    assert!(service
        .distribution(&owner("u-1"), DistributionScope::All)
        .expect("distribution")
        .is_unavailable());
}

#[test]
fn empty_pool_is_available_and_empty() {
    let (service, _, _) = build_service(
        ScoringConfig::default(),
        vec![full_record("u-1", &[])],
        Vec::new(),
    );

    let page = service
        .rank(
            &owner("u-1"),
            RankRequest {
                min_score: 0,
                page: PageRequest::new(1, 10),
            },
        )
        .expect("rank")
        .available()
        .expect("available");

    assert!(page.is_empty());
}

#[test]
fn store_outage_surfaces_as_store_error() {
    let service = MatchingService::new(
        Arc::new(UnavailableStore),
        Arc::new(StaticSource::default()),
        ScoringConfig::default(),
    )
    .expect("service");

    assert!(matches!(
        service.preferences(&owner("u-1")),
        Err(MatchingServiceError::Store(StoreError::Unavailable(_)))
    ));
}

#[test]
fn distribution_scope_selects_the_summarized_slice() {
    let viewer = ladder_viewer();
    let (service, _, _) = build_service(
        ladder_config(),
        vec![viewer.clone()],
        ladder_pool(&[95, 85, 65, 45]),
    );

    let all = service
        .distribution(viewer.owner_id(), DistributionScope::All)
        .expect("distribution")
        .available()
        .expect("available");
    assert_eq!(all.total_count, 4);
    assert_eq!(all.average_score, 73);

    let filtered = service
        .distribution(viewer.owner_id(), DistributionScope::AboveThreshold(60))
        .expect("distribution")
        .available()
        .expect("available");
    assert_eq!(filtered.total_count, 3);
    assert_eq!(filtered.band_count(CompatibilityBand::Poor), 0);
    assert_eq!(filtered.average_score, 82);
}

#[test]
fn compatibility_uses_stored_records_and_neutral_for_missing() {
    let (service, _, _) = build_service(
        ScoringConfig::default(),
        vec![full_record("a", &["smoking"]), full_record("b", &["smoking"])],
        Vec::new(),
    );

    let paired = service
        .compatibility(&owner("a"), &owner("b"))
        .expect("compatibility");
    assert_eq!(paired.score, 93);

    let missing = service
        .compatibility(&owner("a"), &owner("ghost"))
        .expect("compatibility");
    assert_eq!(missing.score, 50);
}
