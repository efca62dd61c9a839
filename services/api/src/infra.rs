use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use roommate_match::roommates::{
    Candidate, CandidateSource, OwnerId, PreferenceAnswers, PreferenceRecord, PreferenceStore,
    Questionnaire, SourceError, StoreError,
};
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone)]
struct Member {
    joined_at: DateTime<Utc>,
    record: Option<PreferenceRecord>,
}

/// Process-local member directory backing both the preference store and the candidate pool.
///
/// Every owner who saves preferences joins the pool; imported candidates join on enrollment.
pub(crate) struct InMemoryRoommateDirectory {
    questionnaire: Arc<Questionnaire>,
    members: Mutex<BTreeMap<OwnerId, Member>>,
}

impl InMemoryRoommateDirectory {
    pub(crate) fn new(questionnaire: Arc<Questionnaire>) -> Self {
        Self {
            questionnaire,
            members: Mutex::new(BTreeMap::new()),
        }
    }

    pub(crate) fn enroll(&self, candidates: Vec<Candidate>) -> Result<usize, StoreError> {
        let mut guard = self.lock()?;
        let count = candidates.len();
        for candidate in candidates {
            guard.insert(
                candidate.id,
                Member {
                    joined_at: candidate.created_at,
                    record: candidate.preference_record,
                },
            );
        }
        Ok(count)
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<OwnerId, Member>>, StoreError> {
        self.members
            .lock()
            .map_err(|_| StoreError::Unavailable("member directory lock poisoned".to_string()))
    }
}

impl PreferenceStore for InMemoryRoommateDirectory {
    fn get(&self, owner_id: &OwnerId) -> Result<Option<PreferenceRecord>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .get(owner_id)
            .and_then(|member| member.record.clone()))
    }

    fn put(
        &self,
        owner_id: &OwnerId,
        answers: PreferenceAnswers,
        updated_at: DateTime<Utc>,
    ) -> Result<PreferenceRecord, StoreError> {
        let record =
            PreferenceRecord::build(owner_id.clone(), answers, &self.questionnaire, updated_at)?;

        let mut guard = self.lock()?;
        let member = guard.entry(owner_id.clone()).or_insert(Member {
            joined_at: updated_at,
            record: None,
        });
        member.record = Some(record.clone());
        Ok(record)
    }
}

impl CandidateSource for InMemoryRoommateDirectory {
    fn candidates_for(&self, _viewer_id: &OwnerId) -> Result<Vec<Candidate>, SourceError> {
        let guard = self
            .members
            .lock()
            .map_err(|_| SourceError::Unavailable("member directory lock poisoned".to_string()))?;

        Ok(guard
            .iter()
            .map(|(id, member)| Candidate::new(id.clone(), member.joined_at, member.record.clone()))
            .collect())
    }
}
