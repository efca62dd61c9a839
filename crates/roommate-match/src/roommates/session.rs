//! Step-by-step questionnaire walk that produces a preference record.
//!
//! The session is an explicit state machine: `InProgress(step, draft)` until the
//! user moves past the last question, then `Completed(answers)`. `next` doubles as
//! "skip", so unanswered questions are allowed and simply leave the record
//! incomplete.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::preferences::{
    validate_answer, Answer, OwnerId, PreferenceAnswers, PreferenceRecord, ValidationError,
};
use super::questionnaire::{Question, Questionnaire};
use super::repository::{PreferenceStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    InProgress {
        step: usize,
        draft: PreferenceAnswers,
    },
    Completed {
        answers: PreferenceAnswers,
    },
}

/// Where the session landed after a navigation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Question(usize),
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub step: Option<usize>,
    pub answered: usize,
    pub total: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("questionnaire is still in progress")]
    NotCompleted,
    #[error("saving preferences failed; answers kept for retry: {0}")]
    Persist(#[source] StoreError),
}

#[derive(Debug, Clone)]
pub struct QuestionnaireSession {
    questionnaire: Arc<Questionnaire>,
    owner_id: OwnerId,
    state: SessionState,
}

impl QuestionnaireSession {
    /// Start at the first step, seeded with a prior record's answers when editing.
    pub fn start(
        questionnaire: Arc<Questionnaire>,
        owner_id: OwnerId,
        existing: Option<&PreferenceRecord>,
    ) -> Self {
        let draft = existing
            .map(|record| record.answers().clone())
            .unwrap_or_default();

        Self {
            questionnaire,
            owner_id,
            state: SessionState::InProgress { step: 0, draft },
        }
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, SessionState::Completed { .. })
    }

    pub fn answers(&self) -> &PreferenceAnswers {
        match &self.state {
            SessionState::InProgress { draft, .. } => draft,
            SessionState::Completed { answers } => answers,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        match &self.state {
            SessionState::InProgress { step, .. } => self.questionnaire.question_at(*step),
            SessionState::Completed { .. } => None,
        }
    }

    pub fn progress(&self) -> SessionProgress {
        let step = match &self.state {
            SessionState::InProgress { step, .. } => Some(*step),
            SessionState::Completed { .. } => None,
        };
        let answers = self.answers();
        let answered = self
            .questionnaire
            .questions()
            .iter()
            .filter(|question| answers.contains_key(&question.id))
            .count();

        SessionProgress {
            step,
            answered,
            total: self.questionnaire.len(),
        }
    }

    /// Record an answer without moving. Invalid values leave the session untouched.
    pub fn answer(&mut self, question_id: &str, value: Answer) -> Result<(), ValidationError> {
        let SessionState::InProgress { draft, .. } = &mut self.state else {
            return Err(ValidationError::SessionCompleted);
        };

        let question = self
            .questionnaire
            .question(question_id)
            .ok_or_else(|| ValidationError::UnknownQuestion(question_id.to_string()))?;
        validate_answer(question, &value)?;

        draft.insert(question.id.clone(), value);
        Ok(())
    }

    /// Advance one step, completing the session when moving past the last question.
    pub fn next(&mut self) -> Step {
        let state = std::mem::replace(
            &mut self.state,
            SessionState::Completed {
                answers: PreferenceAnswers::new(),
            },
        );

        let (state, step) = match state {
            SessionState::InProgress { step, draft } if step + 1 < self.questionnaire.len() => (
                SessionState::InProgress {
                    step: step + 1,
                    draft,
                },
                Step::Question(step + 1),
            ),
            SessionState::InProgress { draft, .. } => {
                debug!(owner = %self.owner_id, answered = draft.len(), "questionnaire completed");
                (SessionState::Completed { answers: draft }, Step::Completed)
            }
            completed @ SessionState::Completed { .. } => (completed, Step::Completed),
        };

        self.state = state;
        step
    }

    /// Step back, floored at the first question. A completed session reopens on the last question.
    pub fn previous(&mut self) -> Step {
        let last_step = self.questionnaire.len().saturating_sub(1);

        match &mut self.state {
            SessionState::InProgress { step, .. } => {
                *step = step.saturating_sub(1);
                Step::Question(*step)
            }
            SessionState::Completed { answers } => {
                let draft = std::mem::take(answers);
                self.state = SessionState::InProgress {
                    step: last_step,
                    draft,
                };
                Step::Question(last_step)
            }
        }
    }

    /// Build the record a completed session emits.
    pub fn record(&self, updated_at: DateTime<Utc>) -> Result<PreferenceRecord, SessionError> {
        let SessionState::Completed { answers } = &self.state else {
            return Err(SessionError::NotCompleted);
        };

        let record = PreferenceRecord::build(
            self.owner_id.clone(),
            answers.clone(),
            &self.questionnaire,
            updated_at,
        )?;
        Ok(record)
    }

    /// Persist a completed session, replacing any prior record for the owner.
    ///
    /// On failure the session stays completed with its answers, so the call can be retried.
    pub fn submit<S>(
        &self,
        store: &S,
        updated_at: DateTime<Utc>,
    ) -> Result<PreferenceRecord, SessionError>
    where
        S: PreferenceStore + ?Sized,
    {
        let record = self.record(updated_at)?;

        store
            .put(&self.owner_id, record.into_answers(), updated_at)
            .map_err(|error| {
                warn!(owner = %self.owner_id, %error, "failed to persist questionnaire answers");
                SessionError::Persist(error)
            })
    }
}
