use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::analytics::{summarize, MatchDistribution};
use super::preferences::{OwnerId, PreferenceAnswers, PreferenceRecord, ValidationError};
use super::questionnaire::Questionnaire;
use super::ranking::{rank_candidates, score_pool, Candidate, RankRequest, RankedPage};
use super::repository::{CandidateSource, PreferenceStore, StoreError};
use super::scoring::{
    CompatibilityResult, CompatibilityScorer, Participant, ScoringConfig, WeightTableError,
};
use super::session::{QuestionnaireSession, SessionError};

/// Result of a request that depends on the candidate pool.
///
/// `Unavailable` means the pool could not be fetched; an empty pool is `Available`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PoolOutcome<T> {
    Available { data: T },
    Unavailable { reason: String },
}

impl<T> PoolOutcome<T> {
    pub fn available(self) -> Option<T> {
        match self {
            PoolOutcome::Available { data } => Some(data),
            PoolOutcome::Unavailable { .. } => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, PoolOutcome::Unavailable { .. })
    }
}

/// Which slice of the pool the analytics summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionScope {
    All,
    AboveThreshold(u8),
}

/// Service composing the questionnaire, scorer, preference store, and candidate source.
pub struct MatchingService<S, C> {
    questionnaire: Arc<Questionnaire>,
    scorer: Arc<CompatibilityScorer>,
    store: Arc<S>,
    source: Arc<C>,
}

impl<S, C> MatchingService<S, C>
where
    S: PreferenceStore + 'static,
    C: CandidateSource + 'static,
{
    pub fn new(
        store: Arc<S>,
        source: Arc<C>,
        config: ScoringConfig,
    ) -> Result<Self, MatchingServiceError> {
        Self::with_questionnaire(Questionnaire::standard(), store, source, config)
    }

    pub fn with_questionnaire(
        questionnaire: Questionnaire,
        store: Arc<S>,
        source: Arc<C>,
        config: ScoringConfig,
    ) -> Result<Self, MatchingServiceError> {
        config.validate(&questionnaire)?;

        Ok(Self {
            questionnaire: Arc::new(questionnaire),
            scorer: Arc::new(CompatibilityScorer::new(config)),
            store,
            source,
        })
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn scorer(&self) -> &CompatibilityScorer {
        &self.scorer
    }

    pub fn preferences(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Option<PreferenceRecord>, MatchingServiceError> {
        Ok(self.store.get(owner_id)?)
    }

    /// Open a questionnaire session, resuming from the owner's stored answers if any.
    pub fn start_session(
        &self,
        owner_id: OwnerId,
    ) -> Result<QuestionnaireSession, MatchingServiceError> {
        let existing = self.store.get(&owner_id)?;
        Ok(QuestionnaireSession::start(
            self.questionnaire.clone(),
            owner_id,
            existing.as_ref(),
        ))
    }

    pub fn complete_session(
        &self,
        session: &QuestionnaireSession,
    ) -> Result<PreferenceRecord, MatchingServiceError> {
        let record = session.submit(self.store.as_ref(), Utc::now())?;
        info!(
            owner = %record.owner_id(),
            complete = record.is_complete(),
            "questionnaire answers saved"
        );
        Ok(record)
    }

    /// Replace the owner's record with `answers` after validating them.
    pub fn save_preferences(
        &self,
        owner_id: &OwnerId,
        answers: PreferenceAnswers,
    ) -> Result<PreferenceRecord, MatchingServiceError> {
        let updated_at = Utc::now();
        let record =
            PreferenceRecord::build(owner_id.clone(), answers, &self.questionnaire, updated_at)?;

        let stored = self
            .store
            .put(owner_id, record.into_answers(), updated_at)
            .map_err(|error| {
                warn!(owner = %owner_id, %error, "preference store rejected update");
                error
            })?;

        info!(owner = %owner_id, complete = stored.is_complete(), "preferences replaced");
        Ok(stored)
    }

    pub fn compatibility(
        &self,
        viewer_id: &OwnerId,
        candidate_id: &OwnerId,
    ) -> Result<CompatibilityResult, MatchingServiceError> {
        let viewer = self.store.get(viewer_id)?;
        let candidate = self.store.get(candidate_id)?;

        Ok(self.scorer.score(
            Participant::new(viewer_id, viewer.as_ref()),
            Participant::new(candidate_id, candidate.as_ref()),
        ))
    }

    pub fn rank(
        &self,
        viewer_id: &OwnerId,
        request: RankRequest,
    ) -> Result<PoolOutcome<RankedPage>, MatchingServiceError> {
        let viewer = self.store.get(viewer_id)?;
        let candidates = match self.pool_for(viewer_id) {
            PoolOutcome::Available { data } => data,
            PoolOutcome::Unavailable { reason } => {
                return Ok(PoolOutcome::Unavailable { reason });
            }
        };

        let pool_size = candidates.len();
        let page = rank_candidates(&self.scorer, viewer_id, viewer.as_ref(), candidates, request);
        debug!(
            viewer = %viewer_id,
            pool_size,
            matches = page.total_matches,
            "ranked candidate pool"
        );

        Ok(PoolOutcome::Available { data: page })
    }

    pub fn distribution(
        &self,
        viewer_id: &OwnerId,
        scope: DistributionScope,
    ) -> Result<PoolOutcome<MatchDistribution>, MatchingServiceError> {
        let viewer = self.store.get(viewer_id)?;
        let candidates = match self.pool_for(viewer_id) {
            PoolOutcome::Available { data } => data,
            PoolOutcome::Unavailable { reason } => {
                return Ok(PoolOutcome::Unavailable { reason });
            }
        };

        let results = score_pool(&self.scorer, viewer_id, viewer.as_ref(), &candidates);
        let distribution = match scope {
            DistributionScope::All => summarize(&results, self.scorer.factors()),
            DistributionScope::AboveThreshold(min_score) => summarize(
                results.iter().filter(|result| result.score >= min_score),
                self.scorer.factors(),
            ),
        };

        Ok(PoolOutcome::Available { data: distribution })
    }

    fn pool_for(&self, viewer_id: &OwnerId) -> PoolOutcome<Vec<Candidate>> {
        match self.source.candidates_for(viewer_id) {
            Ok(mut candidates) => {
                candidates.retain(|candidate| &candidate.id != viewer_id);
                PoolOutcome::Available { data: candidates }
            }
            Err(error) => {
                warn!(viewer = %viewer_id, %error, "candidate pool unavailable");
                PoolOutcome::Unavailable {
                    reason: error.to_string(),
                }
            }
        }
    }
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] WeightTableError),
}
