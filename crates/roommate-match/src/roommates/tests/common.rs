use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::roommates::preferences::{
    Answer, OwnerId, PreferenceAnswers, PreferenceRecord,
};
use crate::roommates::questionnaire::Questionnaire;
use crate::roommates::ranking::Candidate;
use crate::roommates::repository::{CandidateSource, PreferenceStore, SourceError, StoreError};
use crate::roommates::router::{matching_router, MatchLimits};
use crate::roommates::scoring::{ScoringConfig, WeightedFactor};
use crate::roommates::service::MatchingService;

pub(super) fn questionnaire() -> Arc<Questionnaire> {
    Arc::new(Questionnaire::standard())
}

pub(super) fn timestamp(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, day, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn owner(id: &str) -> OwnerId {
    OwnerId::new(id)
}

pub(super) fn answers(entries: &[(&str, Answer)]) -> PreferenceAnswers {
    entries
        .iter()
        .map(|(id, answer)| ((*id).to_string(), answer.clone()))
        .collect()
}

pub(super) fn record(id: &str, entries: &[(&str, Answer)]) -> PreferenceRecord {
    PreferenceRecord::build(
        owner(id),
        answers(entries),
        &Questionnaire::standard(),
        timestamp(1),
    )
    .expect("fixture answers are valid")
}

pub(super) fn full_answers(deal_breakers: &[&str]) -> PreferenceAnswers {
    answers(&[
        ("cleanliness", Answer::Scale(4)),
        ("noise_level", Answer::Scale(2)),
        ("social_level", Answer::Scale(3)),
        ("sleep_schedule", Answer::choice("night_owl")),
        ("study_habits", Answer::choice("library")),
        ("cooking_habits", Answer::choice("few_times_week")),
        ("sharing_comfort", Answer::Scale(3)),
        ("guest_frequency", Answer::choice("weekends")),
        ("pet_preference", Answer::choice("likes_pets")),
        ("deal_breakers", Answer::multi(deal_breakers.iter().copied())),
    ])
}

pub(super) fn full_record(id: &str, deal_breakers: &[&str]) -> PreferenceRecord {
    PreferenceRecord::build(
        owner(id),
        full_answers(deal_breakers),
        &Questionnaire::standard(),
        timestamp(1),
    )
    .expect("fixture answers are valid")
}

/// Two-factor table where a candidate's score is `100 - 5 * d_clean - 20 * d_noise`.
pub(super) fn ladder_config() -> ScoringConfig {
    ScoringConfig::with_factors(vec![
        WeightedFactor::new("cleanliness", 0.2),
        WeightedFactor::new("noise_level", 0.8),
    ])
}

pub(super) fn ladder_viewer() -> PreferenceRecord {
    record(
        "viewer",
        &[
            ("cleanliness", Answer::Scale(1)),
            ("noise_level", Answer::Scale(1)),
        ],
    )
}

/// Candidate whose score against [`ladder_viewer`] under [`ladder_config`] is `score`.
pub(super) fn ladder_candidate(id: &str, score: u8, created_at: DateTime<Utc>) -> Candidate {
    let (clean, noise) = (0_u8..=4)
        .flat_map(|noise| (0_u8..=4).map(move |clean| (clean, noise)))
        .find(|(clean, noise)| 100 - 5 * u16::from(*clean) - 20 * u16::from(*noise) == u16::from(score))
        .expect("score reachable on the ladder");

    Candidate::new(
        owner(id),
        created_at,
        Some(record(
            id,
            &[
                ("cleanliness", Answer::Scale(1 + clean)),
                ("noise_level", Answer::Scale(1 + noise)),
            ],
        )),
    )
}

/// Pool with the given scores; later entries are newer.
pub(super) fn ladder_pool(scores: &[u8]) -> Vec<Candidate> {
    scores
        .iter()
        .enumerate()
        .map(|(index, score)| {
            ladder_candidate(
                &format!("c-{index:02}"),
                *score,
                timestamp(1) + Duration::hours(index as i64),
            )
        })
        .collect()
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) records: Arc<Mutex<HashMap<OwnerId, PreferenceRecord>>>,
}

impl MemoryStore {
    pub(super) fn seeded(records: Vec<PreferenceRecord>) -> Self {
        let store = Self::default();
        {
            let mut guard = store.records.lock().expect("store mutex poisoned");
            for record in records {
                guard.insert(record.owner_id().clone(), record);
            }
        }
        store
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("store mutex poisoned").len()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, owner_id: &OwnerId) -> Result<Option<PreferenceRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(owner_id).cloned())
    }

    fn put(
        &self,
        owner_id: &OwnerId,
        answers: PreferenceAnswers,
        updated_at: DateTime<Utc>,
    ) -> Result<PreferenceRecord, StoreError> {
        let record = PreferenceRecord::build(
            owner_id.clone(),
            answers,
            &Questionnaire::standard(),
            updated_at,
        )?;
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.insert(owner_id.clone(), record.clone());
        Ok(record)
    }
}

/// Store whose writes fail until `recover` is called.
#[derive(Default)]
pub(super) struct FlakyStore {
    pub(super) inner: MemoryStore,
    recovered: AtomicBool,
}

impl FlakyStore {
    pub(super) fn recover(&self) {
        self.recovered.store(true, Ordering::SeqCst);
    }
}

impl PreferenceStore for FlakyStore {
    fn get(&self, owner_id: &OwnerId) -> Result<Option<PreferenceRecord>, StoreError> {
        self.inner.get(owner_id)
    }

    fn put(
        &self,
        owner_id: &OwnerId,
        answers: PreferenceAnswers,
        updated_at: DateTime<Utc>,
    ) -> Result<PreferenceRecord, StoreError> {
        if !self.recovered.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write timeout".to_string()));
        }
        self.inner.put(owner_id, answers, updated_at)
    }
}

pub(super) struct UnavailableStore;

impl PreferenceStore for UnavailableStore {
    fn get(&self, _owner_id: &OwnerId) -> Result<Option<PreferenceRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn put(
        &self,
        _owner_id: &OwnerId,
        _answers: PreferenceAnswers,
        _updated_at: DateTime<Utc>,
    ) -> Result<PreferenceRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct StaticSource {
    candidates: Arc<Mutex<Vec<Candidate>>>,
}

impl StaticSource {
    pub(super) fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates: Arc::new(Mutex::new(candidates)),
        }
    }
}

impl CandidateSource for StaticSource {
    fn candidates_for(&self, _viewer_id: &OwnerId) -> Result<Vec<Candidate>, SourceError> {
        Ok(self.candidates.lock().expect("source mutex poisoned").clone())
    }
}

pub(super) struct UnavailableSource;

impl CandidateSource for UnavailableSource {
    fn candidates_for(&self, _viewer_id: &OwnerId) -> Result<Vec<Candidate>, SourceError> {
        Err(SourceError::Unavailable("listing service timed out".to_string()))
    }
}

pub(super) fn build_service(
    config: ScoringConfig,
    store_records: Vec<PreferenceRecord>,
    pool: Vec<Candidate>,
) -> (
    MatchingService<MemoryStore, StaticSource>,
    Arc<MemoryStore>,
    Arc<StaticSource>,
) {
    let store = Arc::new(MemoryStore::seeded(store_records));
    let source = Arc::new(StaticSource::new(pool));
    let service = MatchingService::new(store.clone(), source.clone(), config)
        .expect("fixture scoring config is valid");
    (service, store, source)
}

pub(super) fn router_with_service<S, C>(service: MatchingService<S, C>) -> axum::Router
where
    S: PreferenceStore + 'static,
    C: CandidateSource + 'static,
{
    matching_router(Arc::new(service), MatchLimits::default())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
