use serde::{Deserialize, Serialize};

use super::preferences::OptionValue;

/// Shape of the answer a question accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    Scale,
    SingleChoice,
    MultiSelect,
}

impl AnswerType {
    pub const fn label(self) -> &'static str {
        match self {
            AnswerType::Scale => "scale",
            AnswerType::SingleChoice => "single_choice",
            AnswerType::MultiSelect => "multi_select",
        }
    }
}

/// Grouping used when presenting questions and explaining factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Lifestyle,
    Social,
    Schedule,
    Household,
    Boundaries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: OptionValue,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub category: QuestionCategory,
    pub prompt: String,
    pub answer_type: AnswerType,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn has_option(&self, value: &OptionValue) -> bool {
        self.options.iter().any(|option| &option.value == value)
    }
}

/// Immutable, ordered question set. Order defines the session's step order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Questionnaire {
    questions: Vec<Question>,
}

impl Questionnaire {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// The campus roommate questionnaire shipped with the product.
    pub fn standard() -> Self {
        let questions = vec![
            scale(
                "cleanliness",
                QuestionCategory::Lifestyle,
                "How tidy do you keep shared spaces?",
                ["Very relaxed", "Relaxed", "Average", "Tidy", "Spotless"],
            ),
            scale(
                "noise_level",
                QuestionCategory::Lifestyle,
                "How much noise are you comfortable with at home?",
                ["Silent", "Quiet", "Moderate", "Lively", "Loud"],
            ),
            scale(
                "social_level",
                QuestionCategory::Social,
                "How social do you want your living situation to be?",
                [
                    "Keep to myself",
                    "Occasionally social",
                    "Balanced",
                    "Social",
                    "Always hanging out",
                ],
            ),
            choice(
                "sleep_schedule",
                QuestionCategory::Schedule,
                "What does your sleep schedule look like?",
                &[
                    ("early_bird", "Early bird"),
                    ("night_owl", "Night owl"),
                    ("flexible", "Flexible"),
                ],
            ),
            choice(
                "study_habits",
                QuestionCategory::Schedule,
                "Where and how do you usually study?",
                &[
                    ("library", "Mostly at the library"),
                    ("quiet_room", "In my room, quietly"),
                    ("background_music", "In my room with music"),
                    ("study_groups", "With study groups at home"),
                ],
            ),
            choice(
                "cooking_habits",
                QuestionCategory::Household,
                "How often do you cook?",
                &[
                    ("daily", "Daily"),
                    ("few_times_week", "A few times a week"),
                    ("rarely", "Rarely"),
                ],
            ),
            scale(
                "sharing_comfort",
                QuestionCategory::Household,
                "How comfortable are you sharing groceries and supplies?",
                [
                    "Keep everything separate",
                    "Rarely share",
                    "Share some basics",
                    "Happy to share",
                    "Share everything",
                ],
            ),
            choice(
                "guest_frequency",
                QuestionCategory::Social,
                "How often do you have guests over?",
                &[
                    ("rarely", "Rarely"),
                    ("weekends", "On weekends"),
                    ("often", "Often"),
                ],
            ),
            choice(
                "pet_preference",
                QuestionCategory::Household,
                "How do you feel about pets?",
                &[
                    ("has_pets", "I have pets"),
                    ("likes_pets", "I like pets"),
                    ("no_pets", "No pets please"),
                ],
            ),
            multi(
                "deal_breakers",
                QuestionCategory::Boundaries,
                "Which of these would be a deal breaker for you?",
                &[
                    ("smoking", "Smoking"),
                    ("pets", "Pets"),
                    ("overnight_guests", "Frequent overnight guests"),
                    ("loud_music", "Loud music"),
                    ("messiness", "Messiness"),
                    ("parties", "Parties"),
                ],
            ),
        ];

        Self::new(questions)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn question_at(&self, step: usize) -> Option<&Question> {
        self.questions.get(step)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|question| question.id == id)
    }
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self::standard()
    }
}

fn scale(id: &str, category: QuestionCategory, prompt: &str, labels: [&str; 5]) -> Question {
    let options = labels
        .iter()
        .zip(1_i64..)
        .map(|(label, value)| QuestionOption {
            value: OptionValue::Number(value),
            label: (*label).to_string(),
        })
        .collect();

    Question {
        id: id.to_string(),
        category,
        prompt: prompt.to_string(),
        answer_type: AnswerType::Scale,
        options,
    }
}

fn choice(
    id: &str,
    category: QuestionCategory,
    prompt: &str,
    options: &[(&str, &str)],
) -> Question {
    enumerated(id, category, prompt, AnswerType::SingleChoice, options)
}

fn multi(id: &str, category: QuestionCategory, prompt: &str, options: &[(&str, &str)]) -> Question {
    enumerated(id, category, prompt, AnswerType::MultiSelect, options)
}

fn enumerated(
    id: &str,
    category: QuestionCategory,
    prompt: &str,
    answer_type: AnswerType,
    options: &[(&str, &str)],
) -> Question {
    Question {
        id: id.to_string(),
        category,
        prompt: prompt.to_string(),
        answer_type,
        options: options
            .iter()
            .map(|(value, label)| QuestionOption {
                value: OptionValue::Text((*value).to_string()),
                label: (*label).to_string(),
            })
            .collect(),
    }
}
