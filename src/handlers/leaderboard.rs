// src/handlers/leaderboard.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::attempt::{QuizLeaderboardEntry, RecentAttemptEntry, TopUserEntry},
};

/// Overall leaderboard: top users by total score across all completed
/// attempts, plus the ten most recent completions. Orphaned in-progress
/// attempts never appear here.
pub async fn get_leaderboard(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let top_users = sqlx::query_as::<_, TopUserEntry>(
        r#"
        SELECT u.username,
               CAST(SUM(a.score) AS INTEGER) as total_score,
               COUNT(a.id) as total_attempts,
               CAST(AVG(a.score) AS REAL) as avg_score
        FROM quiz_attempts a
        JOIN users u ON a.user_id = u.id
        WHERE a.is_completed = 1
        GROUP BY a.user_id, u.username
        ORDER BY total_score DESC
        LIMIT 10
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch leaderboard: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let recent_attempts = sqlx::query_as::<_, RecentAttemptEntry>(
        r#"
        SELECT u.username, q.title as quiz_title, a.score, a.total_questions, a.completed_at
        FROM quiz_attempts a
        JOIN users u ON a.user_id = u.id
        JOIN quizzes q ON a.quiz_id = q.id
        WHERE a.is_completed = 1
        ORDER BY a.completed_at DESC
        LIMIT 10
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "top_users": top_users,
        "recent_attempts": recent_attempts
    })))
}

/// Per-quiz leaderboard: best completed attempts ranked by score descending
/// with elapsed time as the tie-break.
pub async fn get_quiz_leaderboard(
    State(pool): State<SqlitePool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quizzes WHERE id = ?")
        .bind(quiz_id)
        .fetch_one(&pool)
        .await?;

    if quiz_exists == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let top_attempts = sqlx::query_as::<_, QuizLeaderboardEntry>(
        r#"
        SELECT u.username, a.score, a.total_questions, a.time_taken, a.completed_at
        FROM quiz_attempts a
        JOIN users u ON a.user_id = u.id
        WHERE a.quiz_id = ? AND a.is_completed = 1
        ORDER BY a.score DESC, a.time_taken ASC
        LIMIT 10
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(top_attempts))
}
