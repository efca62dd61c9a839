use chrono::{DateTime, Utc};

use super::preferences::{OwnerId, PreferenceAnswers, PreferenceRecord};
use super::ranking::Candidate;

/// Storage abstraction for preference records. `put` replaces the owner's record wholesale.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, owner_id: &OwnerId) -> Result<Option<PreferenceRecord>, StoreError>;
    fn put(
        &self,
        owner_id: &OwnerId,
        answers: PreferenceAnswers,
        updated_at: DateTime<Utc>,
    ) -> Result<PreferenceRecord, StoreError>;
}

/// Supplier of the candidate pool shown to a viewer.
pub trait CandidateSource: Send + Sync {
    fn candidates_for(&self, viewer_id: &OwnerId) -> Result<Vec<Candidate>, SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("preference answers rejected: {0}")]
    Rejected(#[from] super::preferences::ValidationError),
    #[error("preference store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("candidate source unavailable: {0}")]
    Unavailable(String),
}
