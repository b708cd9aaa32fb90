// src/handlers/results.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{error::AppError, models::attempt::MyResultEntry, utils::jwt::Claims};

/// Lists the caller's completed attempts, newest first.
pub async fn my_results(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = sqlx::query_as::<_, MyResultEntry>(
        r#"
        SELECT a.id as attempt_id, a.quiz_id, q.title as quiz_title,
               a.score, a.total_questions, a.time_taken, a.completed_at
        FROM quiz_attempts a
        JOIN quizzes q ON a.quiz_id = q.id
        WHERE a.user_id = ? AND a.is_completed = 1
        ORDER BY a.completed_at DESC
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await?;

    Ok(Json(attempts))
}

/// The caller's five most recent completed attempts on one quiz, shown
/// alongside the quiz detail page. Orphaned in-progress attempts are
/// excluded.
pub async fn my_quiz_attempts(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = sqlx::query_as::<_, MyResultEntry>(
        r#"
        SELECT a.id as attempt_id, a.quiz_id, q.title as quiz_title,
               a.score, a.total_questions, a.time_taken, a.completed_at
        FROM quiz_attempts a
        JOIN quizzes q ON a.quiz_id = q.id
        WHERE a.user_id = ? AND a.quiz_id = ? AND a.is_completed = 1
        ORDER BY a.completed_at DESC
        LIMIT 5
        "#,
    )
    .bind(claims.user_id())
    .bind(quiz_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(attempts))
}
