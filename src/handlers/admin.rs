// src/handlers/admin.rs
//
// Quiz content authoring. All routes here sit behind the auth + admin
// middlewares. Authored text is run through the HTML sanitizer before it
// reaches storage.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        category::CreateCategoryRequest,
        question::CreateQuestionRequest,
        quiz::{CreateQuizRequest, UpdateQuizRequest},
        user::User,
    },
    utils::{html::clean_html, jwt::Claims},
};

/// Lists all users in the system.
pub async fn list_users(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, role, created_at
        FROM users
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

/// Creates a new category.
pub async fn create_category(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let id = sqlx::query("INSERT INTO categories (name, description) VALUES (?, ?)")
        .bind(clean_html(&payload.name))
        .bind(clean_html(payload.description.as_deref().unwrap_or("")))
        .execute(&pool)
        .await?
        .last_insert_rowid();

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// Creates a new quiz owned by the acting admin.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let category_exists =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE id = ?")
            .bind(payload.category_id)
            .fetch_one(&pool)
            .await?;

    if category_exists == 0 {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    let id = sqlx::query(
        r#"
        INSERT INTO quizzes (title, description, category_id, difficulty,
                             time_limit, questions_count, is_active, created_by)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(clean_html(&payload.title))
    .bind(clean_html(payload.description.as_deref().unwrap_or("")))
    .bind(payload.category_id)
    .bind(payload.difficulty.as_deref().unwrap_or("medium"))
    .bind(payload.time_limit.unwrap_or(30))
    .bind(payload.questions_count.unwrap_or(10))
    .bind(payload.is_active.unwrap_or(true))
    .bind(claims.user_id())
    .execute(&pool)
    .await?
    .last_insert_rowid();

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// Updates quiz fields. Only provided fields change.
/// Quiz definitions are immutable during an attempt only by convention: the
/// frozen session sequence shields in-flight attempts from edits here.
pub async fn update_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let updated = sqlx::query(
        r#"
        UPDATE quizzes
        SET title = COALESCE(?, title),
            description = COALESCE(?, description),
            category_id = COALESCE(?, category_id),
            difficulty = COALESCE(?, difficulty),
            time_limit = COALESCE(?, time_limit),
            questions_count = COALESCE(?, questions_count),
            is_active = COALESCE(?, is_active)
        WHERE id = ?
        "#,
    )
    .bind(payload.title.as_deref().map(clean_html))
    .bind(payload.description.as_deref().map(clean_html))
    .bind(payload.category_id)
    .bind(&payload.difficulty)
    .bind(payload.time_limit)
    .bind(payload.questions_count)
    .bind(payload.is_active)
    .bind(id)
    .execute(&pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    Ok(Json(json!({ "updated": true })))
}

/// Deletes a quiz; questions, choices and attempts cascade.
pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = sqlx::query("DELETE FROM quizzes WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Creates a question together with its choices in one transaction.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let quiz_exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quizzes WHERE id = ?")
        .bind(payload.quiz_id)
        .fetch_one(&pool)
        .await?;

    if quiz_exists == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let mut tx = pool.begin().await?;

    let question_id = sqlx::query(
        r#"
        INSERT INTO questions (quiz_id, question_text, question_type, points, time_limit, is_active)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.quiz_id)
    .bind(clean_html(&payload.question_text))
    .bind(payload.question_type.as_deref().unwrap_or("multiple_choice"))
    .bind(payload.points.unwrap_or(1))
    .bind(payload.time_limit.unwrap_or(60))
    .bind(payload.is_active.unwrap_or(true))
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for choice in &payload.choices {
        sqlx::query("INSERT INTO choices (question_id, choice_text, is_correct) VALUES (?, ?, ?)")
            .bind(question_id)
            .bind(clean_html(&choice.choice_text))
            .bind(choice.is_correct)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": question_id }))))
}

/// Deletes a question; its choices and recorded answers cascade.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
