// src/handlers/attempt.rs
//
// The attempt lifecycle: start (freeze a random question sequence into the
// session), step through questions, record/amend answers, finalize into an
// immutable scored attempt.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        attempt::{AnsweredQuestion, AttemptSummary, QuizAttempt, SubmitAnswerRequest},
        question::{Choice, PublicChoice, Question, QuestionView},
        quiz::Quiz,
    },
    selector::select_question_ids,
    session::{AttemptSession, SessionStore},
    utils::jwt::Claims,
};

async fn fetch_attempt(pool: &SqlitePool, id: i64) -> Result<Option<QuizAttempt>, AppError> {
    let attempt = sqlx::query_as::<_, QuizAttempt>(
        r#"
        SELECT id, user_id, quiz_id, score, total_questions, time_taken,
               started_at, completed_at, is_completed
        FROM quiz_attempts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(attempt)
}

async fn count_answers(pool: &SqlitePool, attempt_id: i64) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM user_answers WHERE attempt_id = ?",
    )
    .bind(attempt_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Starts a new attempt on an active quiz.
///
/// Creates the attempt row, draws the frozen question sequence and stores it
/// in the caller's session with the cursor at the first question. Starting a
/// new attempt replaces any previous in-progress session; the replaced
/// attempt row stays open forever and is excluded from all result queries.
pub async fn start_quiz(
    State(pool): State<SqlitePool>,
    State(sessions): State<SessionStore>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();

    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, title, description, category_id, difficulty,
               time_limit, questions_count, is_active, created_by, created_at
        FROM quizzes
        WHERE id = ? AND is_active = 1
        "#,
    )
    .bind(quiz_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let question_pool = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM questions WHERE quiz_id = ? AND is_active = 1 ORDER BY id",
    )
    .bind(quiz_id)
    .fetch_all(&pool)
    .await?;

    let sample_size = usize::try_from(quiz.questions_count).unwrap_or(0);
    let selected = select_question_ids(question_pool, sample_size);
    let total_questions = selected.len() as i64;

    let attempt_id = sqlx::query(
        r#"
        INSERT INTO quiz_attempts (user_id, quiz_id, total_questions, started_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .bind(total_questions)
    .bind(Utc::now())
    .execute(&pool)
    .await?
    .last_insert_rowid();

    sessions
        .insert(user_id, AttemptSession::new(attempt_id, quiz_id, selected))
        .await;

    tracing::info!(
        "User {} started attempt {} on quiz {} ({} questions)",
        user_id,
        attempt_id,
        quiz_id,
        total_questions
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "attempt_id": attempt_id,
            "quiz_id": quiz_id,
            "total_questions": total_questions,
            "first_question": 1
        })),
    ))
}

/// Returns the question at a 1-indexed position of the frozen sequence.
///
/// Past the end of the sequence the response carries `"done": true` instead
/// of a question, telling the caller to proceed to finalization. A missing
/// or stale session means the attempt path must be restarted from the quiz
/// detail page.
pub async fn get_question(
    State(pool): State<SqlitePool>,
    State(sessions): State<SessionStore>,
    Extension(claims): Extension<Claims>,
    Path((quiz_id, position)): Path<(i64, usize)>,
) -> Result<Response, AppError> {
    let user_id = claims.user_id();

    let session = sessions
        .get(user_id)
        .await
        .filter(|s| s.quiz_id == quiz_id)
        .ok_or(AppError::SessionExpired(
            "Quiz session expired. Please start again.".to_string(),
        ))?;

    if position == 0 {
        return Err(AppError::BadRequest(
            "Question positions start at 1".to_string(),
        ));
    }

    let Some(question_id) = session.question_at(position) else {
        // No more questions: show the final-submission step.
        let answered = count_answers(&pool, session.attempt_id).await?;
        let body = Json(json!({
            "done": true,
            "attempt_id": session.attempt_id,
            "total_questions": session.total_questions(),
            "answered_questions": answered
        }));
        return Ok(body.into_response());
    };

    let question = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, quiz_id, question_text, question_type, points,
               time_limit, is_active, created_at
        FROM questions
        WHERE id = ?
        "#,
    )
    .bind(question_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let choices = sqlx::query_as::<_, PublicChoice>(
        "SELECT id, choice_text FROM choices WHERE question_id = ? ORDER BY id",
    )
    .bind(question_id)
    .fetch_all(&pool)
    .await?;

    // Echo back a previously recorded choice so the user can change it.
    let selected_choice_id = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT selected_choice_id FROM user_answers WHERE attempt_id = ? AND question_id = ?",
    )
    .bind(session.attempt_id)
    .bind(question_id)
    .fetch_optional(&pool)
    .await?
    .flatten();

    let view = QuestionView {
        question_id: question.id,
        question_text: question.question_text,
        question_type: question.question_type,
        points: question.points,
        time_limit: question.time_limit,
        position,
        total_questions: session.total_questions(),
        choices,
        selected_choice_id,
    };

    Ok(Json(view).into_response())
}

/// Records one answer and advances the attempt, or finalizes it.
///
/// Answers are upserted by (attempt, question): the last submission for a
/// question wins, and `is_correct` is derived from the choice at write time.
/// With `final_submit` set the finalizer runs after the write; a duplicate
/// final submission degrades to returning the already-sealed summary.
pub async fn submit_answer(
    State(pool): State<SqlitePool>,
    State(sessions): State<SessionStore>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Response, AppError> {
    let user_id = claims.user_id();

    let session = sessions
        .get(user_id)
        .await
        .filter(|s| s.quiz_id == quiz_id)
        .ok_or(AppError::SessionExpired(
            "Quiz session expired. Please start again.".to_string(),
        ))?;

    let attempt = fetch_attempt(&pool, session.attempt_id)
        .await?
        .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    if attempt.user_id != user_id {
        return Err(AppError::Forbidden(
            "You do not own this attempt".to_string(),
        ));
    }

    if attempt.is_completed {
        // Never rewrite a sealed attempt. A racing duplicate of the final
        // request gets the existing result instead of an error.
        if payload.final_submit {
            return Ok(Json(AttemptSummary::from(&attempt)).into_response());
        }
        return Err(AppError::AttemptSealed(
            "Attempt is already completed".to_string(),
        ));
    }

    if let Some(question_id) = payload.question_id {
        if !session.contains(question_id) {
            return Err(AppError::BadRequest(
                "Question is not part of this attempt".to_string(),
            ));
        }

        // Correctness is derived from the choice now and stored; later edits
        // to the choice never retroactively change this answer.
        let (selected_choice_id, is_correct) = match payload.choice_id {
            Some(choice_id) => {
                let choice = sqlx::query_as::<_, Choice>(
                    r#"
                    SELECT id, question_id, choice_text, is_correct
                    FROM choices
                    WHERE id = ? AND question_id = ?
                    "#,
                )
                .bind(choice_id)
                .bind(question_id)
                .fetch_optional(&pool)
                .await?
                .ok_or(AppError::NotFound("Choice not found".to_string()))?;

                (Some(choice.id), choice.is_correct)
            }
            None => (None, false),
        };

        sqlx::query(
            r#"
            INSERT INTO user_answers (attempt_id, question_id, selected_choice_id, is_correct, time_taken)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (attempt_id, question_id) DO UPDATE SET
                selected_choice_id = excluded.selected_choice_id,
                is_correct = excluded.is_correct,
                time_taken = excluded.time_taken
            "#,
        )
        .bind(attempt.id)
        .bind(question_id)
        .bind(selected_choice_id)
        .bind(is_correct)
        .bind(payload.time_taken)
        .execute(&pool)
        .await?;
    }

    if payload.final_submit {
        return finalize_attempt(&pool, &sessions, user_id, attempt.id).await;
    }

    sessions.advance(user_id).await;
    let next_position = sessions.get(user_id).await.and_then(|s| s.next_position());

    Ok(Json(json!({
        "recorded": payload.question_id.is_some(),
        "next_question": next_position,
        "done": next_position.is_none(),
        "total_questions": session.total_questions()
    }))
    .into_response())
}

/// Seals the attempt: score, elapsed time and completion flags change in one
/// conditional UPDATE guarded by `is_completed = 0`, so a racing duplicate
/// cannot re-score. The session is destroyed on success.
async fn finalize_attempt(
    pool: &SqlitePool,
    sessions: &SessionStore,
    user_id: i64,
    attempt_id: i64,
) -> Result<Response, AppError> {
    let correct_answers = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM user_answers WHERE attempt_id = ? AND is_correct = 1",
    )
    .bind(attempt_id)
    .fetch_one(pool)
    .await?;

    let attempt = fetch_attempt(pool, attempt_id)
        .await?
        .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    let now = Utc::now();
    let time_taken = (now - attempt.started_at).num_seconds().max(0);

    let sealed = sqlx::query(
        r#"
        UPDATE quiz_attempts
        SET score = ?, time_taken = ?, completed_at = ?, is_completed = 1
        WHERE id = ? AND is_completed = 0
        "#,
    )
    .bind(correct_answers)
    .bind(time_taken)
    .bind(now)
    .bind(attempt_id)
    .execute(pool)
    .await?
    .rows_affected();

    if sealed == 1 {
        sessions.clear(user_id).await;
        tracing::info!(
            "Attempt {} finalized: {} correct out of {}",
            attempt_id,
            correct_answers,
            attempt.total_questions
        );
    }

    // Read back the sealed row whether we won the race or lost it.
    let attempt = fetch_attempt(pool, attempt_id)
        .await?
        .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    Ok(Json(AttemptSummary::from(&attempt)).into_response())
}

/// Retrieves a completed attempt's result with its per-question answers.
/// Only the attempt's owner may view it.
pub async fn get_result(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = fetch_attempt(&pool, attempt_id)
        .await?
        .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    if attempt.user_id != claims.user_id() {
        return Err(AppError::Forbidden(
            "You do not own this attempt".to_string(),
        ));
    }

    if !attempt.is_completed {
        // Orphaned in-progress attempts have no result to show.
        return Err(AppError::NotFound("Result not available".to_string()));
    }

    let answers = sqlx::query_as::<_, AnsweredQuestion>(
        r#"
        SELECT ua.question_id, q.question_text, ua.selected_choice_id,
               c.choice_text as selected_choice_text, ua.is_correct, ua.time_taken
        FROM user_answers ua
        JOIN questions q ON ua.question_id = q.id
        LEFT JOIN choices c ON ua.selected_choice_id = c.id
        WHERE ua.attempt_id = ?
        ORDER BY ua.id
        "#,
    )
    .bind(attempt_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "attempt": AttemptSummary::from(&attempt),
        "answers": answers
    })))
}
