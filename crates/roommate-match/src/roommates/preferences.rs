use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::questionnaire::{AnswerType, Question, Questionnaire};

pub const SCALE_MIN: u8 = 1;
pub const SCALE_MAX: u8 = 5;

/// Identifier wrapper for the user owning a preference record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Enumerated option value; questions declare either string or integer tokens.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Number(i64),
    Text(String),
}

impl OptionValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Number(value) => write!(f, "{value}"),
            OptionValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// A single questionnaire answer. The variant must match the question's [`AnswerType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Scale(u8),
    Choice(OptionValue),
    Multi(BTreeSet<OptionValue>),
}

impl Answer {
    pub fn choice(value: impl Into<OptionValue>) -> Self {
        Self::Choice(value.into())
    }

    pub fn multi<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<OptionValue>,
    {
        Self::Multi(values.into_iter().map(Into::into).collect())
    }

    pub const fn answer_type(&self) -> AnswerType {
        match self {
            Answer::Scale(_) => AnswerType::Scale,
            Answer::Choice(_) => AnswerType::SingleChoice,
            Answer::Multi(_) => AnswerType::MultiSelect,
        }
    }
}

pub type PreferenceAnswers = BTreeMap<String, Answer>;

/// Rejection raised when an answer does not fit the questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),
    #[error("question '{question_id}' expects a {} answer, got {}", expected.label(), actual.label())]
    WrongAnswerType {
        question_id: String,
        expected: AnswerType,
        actual: AnswerType,
    },
    #[error("question '{question_id}' expects a value between 1 and 5, got {value}")]
    ScaleOutOfRange { question_id: String, value: u8 },
    #[error("'{value}' is not an option of question '{question_id}'")]
    UnknownOption { question_id: String, value: String },
    #[error("questionnaire already completed; go back before changing answers")]
    SessionCompleted,
}

pub fn validate_answer(question: &Question, answer: &Answer) -> Result<(), ValidationError> {
    match (question.answer_type, answer) {
        (AnswerType::Scale, Answer::Scale(value)) => {
            if (SCALE_MIN..=SCALE_MAX).contains(value) {
                Ok(())
            } else {
                Err(ValidationError::ScaleOutOfRange {
                    question_id: question.id.clone(),
                    value: *value,
                })
            }
        }
        (AnswerType::SingleChoice, Answer::Choice(value)) => ensure_option(question, value),
        (AnswerType::MultiSelect, Answer::Multi(values)) => values
            .iter()
            .try_for_each(|value| ensure_option(question, value)),
        (expected, other) => Err(ValidationError::WrongAnswerType {
            question_id: question.id.clone(),
            expected,
            actual: other.answer_type(),
        }),
    }
}

fn ensure_option(question: &Question, value: &OptionValue) -> Result<(), ValidationError> {
    if question.has_option(value) {
        Ok(())
    } else {
        Err(ValidationError::UnknownOption {
            question_id: question.id.clone(),
            value: value.to_string(),
        })
    }
}

pub fn validate_answers(
    questionnaire: &Questionnaire,
    answers: &PreferenceAnswers,
) -> Result<(), ValidationError> {
    for (question_id, answer) in answers {
        let question = questionnaire
            .question(question_id)
            .ok_or_else(|| ValidationError::UnknownQuestion(question_id.clone()))?;
        validate_answer(question, answer)?;
    }
    Ok(())
}

/// A user's full or partial questionnaire answers.
///
/// Records are only built through [`PreferenceRecord::build`], so every stored
/// answer fits its question. Updates replace the whole record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceRecord {
    owner_id: OwnerId,
    answers: PreferenceAnswers,
    is_complete: bool,
    updated_at: DateTime<Utc>,
}

impl PreferenceRecord {
    pub fn build(
        owner_id: OwnerId,
        answers: PreferenceAnswers,
        questionnaire: &Questionnaire,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        validate_answers(questionnaire, &answers)?;

        let is_complete = questionnaire
            .questions()
            .iter()
            .all(|question| answers.contains_key(&question.id));

        Ok(Self {
            owner_id,
            answers,
            is_complete,
            updated_at,
        })
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn answers(&self) -> &PreferenceAnswers {
        &self.answers
    }

    pub fn answer(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn into_answers(self) -> PreferenceAnswers {
        self.answers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn answers_use_tagged_json() {
        let answers: PreferenceAnswers = serde_json::from_value(json!({
            "cleanliness": {"type": "scale", "value": 3},
            "sleep_schedule": {"type": "choice", "value": "flexible"},
            "deal_breakers": {"type": "multi", "value": ["pets", "smoking", "pets"]}
        }))
        .expect("answers deserialize");

        assert_eq!(answers["cleanliness"], Answer::Scale(3));
        assert_eq!(answers["sleep_schedule"], Answer::choice("flexible"));
        assert_eq!(answers["deal_breakers"], Answer::multi(["smoking", "pets"]));
        assert_eq!(
            serde_json::to_value(&answers["cleanliness"]).expect("serialize"),
            json!({"type": "scale", "value": 3})
        );
    }

    #[test]
    fn completeness_requires_every_question() {
        let questionnaire = Questionnaire::standard();
        let mut answers: PreferenceAnswers = questionnaire
            .questions()
            .iter()
            .map(|question| {
                let answer = match question.answer_type {
                    AnswerType::Scale => Answer::Scale(SCALE_MIN),
                    AnswerType::SingleChoice => Answer::Choice(question.options[0].value.clone()),
                    AnswerType::MultiSelect => Answer::Multi(Default::default()),
                };
                (question.id.clone(), answer)
            })
            .collect();

        let complete =
            PreferenceRecord::build(OwnerId::new("u-1"), answers.clone(), &questionnaire, at())
                .expect("valid");
        assert!(complete.is_complete());

        answers.remove("guest_frequency");
        let partial = PreferenceRecord::build(OwnerId::new("u-1"), answers, &questionnaire, at())
            .expect("valid");
        assert!(!partial.is_complete());
    }

    #[test]
    fn build_rejects_answers_outside_the_questionnaire() {
        let questionnaire = Questionnaire::standard();
        let mut answers = PreferenceAnswers::new();
        answers.insert("commute".to_string(), Answer::Scale(2));

        assert_eq!(
            PreferenceRecord::build(OwnerId::new("u-1"), answers, &questionnaire, at()),
            Err(ValidationError::UnknownQuestion("commute".to_string()))
        );
    }

    #[test]
    fn scale_bounds_are_inclusive() {
        let questionnaire = Questionnaire::standard();
        let question = questionnaire.question("noise_level").expect("present");

        assert!(validate_answer(question, &Answer::Scale(SCALE_MIN)).is_ok());
        assert!(validate_answer(question, &Answer::Scale(SCALE_MAX)).is_ok());
        assert!(validate_answer(question, &Answer::Scale(0)).is_err());
        assert!(validate_answer(question, &Answer::Scale(6)).is_err());
    }
}
