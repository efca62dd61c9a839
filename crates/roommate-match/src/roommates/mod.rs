//! Roommate compatibility matching: questionnaire, preference records, scoring,
//! ranking, and match analytics.

pub mod analytics;
pub mod generation;
pub mod import;
pub mod preferences;
pub mod questionnaire;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use analytics::{summarize, FactorContribution, MatchDistribution, MatchInsights, PoolHealth};
pub use generation::{GenerationToken, LatestResult, RequestGeneration};
pub use import::{CandidateImportError, CandidateImporter};
pub use preferences::{
    Answer, OptionValue, OwnerId, PreferenceAnswers, PreferenceRecord, ValidationError,
};
pub use questionnaire::{AnswerType, Question, QuestionCategory, QuestionOption, Questionnaire};
pub use ranking::{
    rank_candidates, score_pool, Candidate, PageRequest, RankRequest, RankedCandidate, RankedPage,
    DEFAULT_MIN_SCORE, DEFAULT_PAGE_SIZE,
};
pub use repository::{CandidateSource, PreferenceStore, SourceError, StoreError};
pub use router::{matching_router, MatchLimits};
pub use scoring::{
    CompatibilityBand, CompatibilityResult, CompatibilityScorer, Participant, ScoringConfig,
    WeightTableError, WeightedFactor,
};
pub use service::{DistributionScope, MatchingService, MatchingServiceError, PoolOutcome};
pub use session::{QuestionnaireSession, SessionError, SessionProgress, SessionState, Step};
