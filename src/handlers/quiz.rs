// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        category::Category,
        quiz::{Quiz, QuizDetail, QuizListParams},
    },
};

/// Lists all categories.
pub async fn list_categories(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, description, created_at
        FROM categories
        ORDER BY name
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(categories))
}

/// Lists active quizzes, newest first, optionally filtered by category
/// and difficulty.
pub async fn list_quizzes(
    State(pool): State<SqlitePool>,
    Query(params): Query<QuizListParams>,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, title, description, category_id, difficulty,
               time_limit, questions_count, is_active, created_by, created_at
        FROM quizzes
        WHERE is_active = 1
          AND (? IS NULL OR category_id = ?)
          AND (? IS NULL OR difficulty = ?)
        ORDER BY created_at DESC
        "#,
    )
    .bind(params.category)
    .bind(params.category)
    .bind(&params.difficulty)
    .bind(&params.difficulty)
    .fetch_all(&pool)
    .await?;

    Ok(Json(quizzes))
}

/// Retrieves a single active quiz with its category name and the number of
/// active questions in its pool.
pub async fn get_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = sqlx::query_as::<_, QuizDetail>(
        r#"
        SELECT q.id, q.title, q.description, q.category_id, c.name as category_name,
               q.difficulty, q.time_limit, q.questions_count, q.created_at,
               (SELECT COUNT(*) FROM questions WHERE quiz_id = q.id AND is_active = 1)
                   as active_questions
        FROM quizzes q
        JOIN categories c ON q.category_id = c.id
        WHERE q.id = ? AND q.is_active = 1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    Ok(Json(quiz))
}
