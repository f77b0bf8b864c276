// src/handlers/results.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{error::AppError, models::result::ExamResult, utils::jwt::Claims};

const RESULT_COLUMNS: &str = "id, student_id, student_name, student_mobile, exam_id, exam_title, \
     subject, test_number, correct_count, wrong_count, score, total_questions, answers, created_at";

/// Lists every stored result, newest first.
pub async fn list_results(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, ExamResult>(&format!(
        "SELECT {RESULT_COLUMNS} FROM results ORDER BY id DESC"
    ))
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list results: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(results))
}

/// Lists the authenticated student's own results.
pub async fn my_results(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, ExamResult>(&format!(
        "SELECT {RESULT_COLUMNS} FROM results WHERE student_id = $1 ORDER BY id DESC"
    ))
    .bind(claims.student_id())
    .fetch_all(&pool)
    .await?;

    Ok(Json(results))
}

/// Lists results for one student, looked up by mobile number.
pub async fn results_by_student(
    State(pool): State<PgPool>,
    Path(mobile): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, ExamResult>(&format!(
        "SELECT {RESULT_COLUMNS} FROM results WHERE student_mobile = $1 ORDER BY id DESC"
    ))
    .bind(mobile)
    .fetch_all(&pool)
    .await?;

    Ok(Json(results))
}

/// Lists results for one exam.
pub async fn results_by_exam(
    State(pool): State<PgPool>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, ExamResult>(&format!(
        "SELECT {RESULT_COLUMNS} FROM results WHERE exam_id = $1 ORDER BY score DESC, id DESC"
    ))
    .bind(exam_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(results))
}
