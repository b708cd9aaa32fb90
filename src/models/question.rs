// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub question_text: String,

    /// 'multiple_choice' or 'true_false'.
    pub question_type: String,

    /// Stored per question but not used by scoring, which counts correct
    /// answers instead of summing points.
    pub points: i64,

    /// Time limit for this question, in seconds.
    pub time_limit: i64,

    pub is_active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'choices' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub choice_text: String,
    pub is_correct: bool,
}

/// Choice DTO sent to a quiz taker (correctness flag hidden).
#[derive(Debug, Serialize, FromRow)]
pub struct PublicChoice {
    pub id: i64,
    pub choice_text: String,
}

/// One step of an in-progress attempt: the question at the requested
/// position plus progress bookkeeping and any previously recorded choice.
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub question_id: i64,
    pub question_text: String,
    pub question_type: String,
    pub points: i64,
    pub time_limit: i64,
    pub position: usize,
    pub total_questions: usize,
    pub choices: Vec<PublicChoice>,
    /// Set when the user already answered this question and came back.
    pub selected_choice_id: Option<i64>,
}

fn validate_question_type(question_type: &str) -> Result<(), validator::ValidationError> {
    match question_type {
        "multiple_choice" | "true_false" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_question_type")),
    }
}

fn validate_choices(choices: &[ChoiceInput]) -> Result<(), validator::ValidationError> {
    if choices.is_empty() {
        return Err(validator::ValidationError::new("choices_cannot_be_empty"));
    }
    for choice in choices {
        if choice.choice_text.is_empty() || choice.choice_text.len() > 200 {
            return Err(validator::ValidationError::new("choice_text_length"));
        }
    }
    Ok(())
}

/// Inline choice row supplied when authoring a question.
/// Serialize is needed so validation errors can echo the offending value.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChoiceInput {
    pub choice_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// DTO for creating a new question with its choices.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    pub quiz_id: i64,
    #[validate(length(min = 1, max = 2000))]
    pub question_text: String,
    #[validate(custom(function = validate_question_type))]
    pub question_type: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub points: Option<i64>,
    #[validate(range(min = 5, max = 3600))]
    pub time_limit: Option<i64>,
    pub is_active: Option<bool>,
    #[validate(custom(function = validate_choices))]
    pub choices: Vec<ChoiceInput>,
}
