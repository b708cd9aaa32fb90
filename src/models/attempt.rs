// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'quiz_attempts' table in the database.
///
/// One user's single pass through a sampled subset of a quiz's questions.
/// Rows are append-then-seal: mutated only through answer upserts and the
/// finalizer, never after `is_completed` flips to true.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: i64,

    /// Length of the question sequence frozen at start.
    pub total_questions: i64,

    /// Elapsed seconds, set only at finalization.
    pub time_taken: Option<i64>,

    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_completed: bool,
}

impl QuizAttempt {
    /// Score as a percentage of the frozen question count, rounded to two
    /// decimal places. Zero when the attempt had no questions.
    pub fn percentage(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        let raw = self.score as f64 / self.total_questions as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }
}

/// Represents the 'user_answers' table in the database.
/// At most one row per (attempt, question); resubmission overwrites in place.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserAnswer {
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,

    /// NULL when the question was left unanswered.
    pub selected_choice_id: Option<i64>,

    /// Derived from the selected choice at write time; never recomputed, so
    /// later edits to a choice's correctness leave history untouched.
    pub is_correct: bool,

    /// Seconds spent on the question, caller-supplied.
    pub time_taken: i64,
}

/// DTO for submitting one answer step of an attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    /// Question being answered; omitted on a bare final submit.
    pub question_id: Option<i64>,
    /// Selected choice; omitted to leave the question unanswered.
    pub choice_id: Option<i64>,
    /// Seconds spent on the question.
    #[serde(default)]
    pub time_taken: i64,
    /// When true, the finalizer runs after the answer is recorded.
    #[serde(default)]
    pub final_submit: bool,
}

/// Summary of a sealed attempt, returned by the finalizer and result pages.
#[derive(Debug, Serialize)]
pub struct AttemptSummary {
    pub attempt_id: i64,
    pub quiz_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub percentage: f64,
    pub time_taken: Option<i64>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&QuizAttempt> for AttemptSummary {
    fn from(attempt: &QuizAttempt) -> Self {
        Self {
            attempt_id: attempt.id,
            quiz_id: attempt.quiz_id,
            score: attempt.score,
            total_questions: attempt.total_questions,
            percentage: attempt.percentage(),
            time_taken: attempt.time_taken,
            completed_at: attempt.completed_at,
        }
    }
}

/// One answered (or skipped) question inside a result view.
#[derive(Debug, Serialize, FromRow)]
pub struct AnsweredQuestion {
    pub question_id: i64,
    pub question_text: String,
    pub selected_choice_id: Option<i64>,
    pub selected_choice_text: Option<String>,
    pub is_correct: bool,
    pub time_taken: i64,
}

/// A completed attempt row in the caller's personal history.
#[derive(Debug, Serialize, FromRow)]
pub struct MyResultEntry {
    pub attempt_id: i64,
    pub quiz_id: i64,
    pub quiz_title: String,
    pub score: i64,
    pub total_questions: i64,
    pub time_taken: Option<i64>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Aggregated leaderboard row: one user's totals across completed attempts.
#[derive(Debug, Serialize, FromRow)]
pub struct TopUserEntry {
    pub username: String,
    pub total_score: i64,
    pub total_attempts: i64,
    pub avg_score: f64,
}

/// A recently completed attempt shown on the overall leaderboard.
#[derive(Debug, Serialize, FromRow)]
pub struct RecentAttemptEntry {
    pub username: String,
    pub quiz_title: String,
    pub score: i64,
    pub total_questions: i64,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A top attempt on a single quiz's leaderboard.
#[derive(Debug, Serialize, FromRow)]
pub struct QuizLeaderboardEntry {
    pub username: String,
    pub score: i64,
    pub total_questions: i64,
    pub time_taken: Option<i64>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(score: i64, total_questions: i64) -> QuizAttempt {
        QuizAttempt {
            id: 1,
            user_id: 1,
            quiz_id: 1,
            score,
            total_questions,
            time_taken: None,
            started_at: chrono::Utc::now(),
            completed_at: None,
            is_completed: true,
        }
    }

    #[test]
    fn percentage_of_empty_attempt_is_zero() {
        assert_eq!(attempt(0, 0).percentage(), 0.0);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(attempt(3, 5).percentage(), 60.0);
        assert_eq!(attempt(1, 3).percentage(), 33.33);
        assert_eq!(attempt(2, 3).percentage(), 66.67);
    }

    #[test]
    fn percentage_full_score() {
        assert_eq!(attempt(5, 5).percentage(), 100.0);
    }
}
