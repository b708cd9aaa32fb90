// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'quizzes' table in the database.
/// Quiz definitions are read-only from the attempt lifecycle's perspective.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category_id: i64,

    /// 'easy', 'medium' or 'hard'.
    pub difficulty: String,

    /// Time limit for the whole quiz, in minutes.
    pub time_limit: i64,

    /// Number of questions drawn per attempt. When fewer active questions
    /// exist, the selector uses the entire pool.
    pub questions_count: i64,

    pub is_active: bool,
    pub created_by: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Quiz detail joined with its category name and active question count.
#[derive(Debug, Serialize, FromRow)]
pub struct QuizDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub category_name: String,
    pub difficulty: String,
    pub time_limit: i64,
    pub questions_count: i64,
    pub active_questions: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Query parameters for listing quizzes.
#[derive(Debug, Deserialize)]
pub struct QuizListParams {
    pub category: Option<i64>,
    pub difficulty: Option<String>,
}

fn validate_difficulty(difficulty: &str) -> Result<(), validator::ValidationError> {
    match difficulty {
        "easy" | "medium" | "hard" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_difficulty")),
    }
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub category_id: i64,
    #[validate(custom(function = validate_difficulty))]
    pub difficulty: Option<String>,
    #[validate(range(min = 1, max = 600))]
    pub time_limit: Option<i64>,
    #[validate(range(min = 0, max = 500))]
    pub questions_count: Option<i64>,
    pub is_active: Option<bool>,
}

/// DTO for updating a quiz. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub category_id: Option<i64>,
    #[validate(custom(function = validate_difficulty))]
    pub difficulty: Option<String>,
    #[validate(range(min = 1, max = 600))]
    pub time_limit: Option<i64>,
    #[validate(range(min = 0, max = 500))]
    pub questions_count: Option<i64>,
    pub is_active: Option<bool>,
}
