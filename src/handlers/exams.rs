// src/handlers/exams.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{PgPool, types::Json as SqlJson};

use crate::{
    error::{AppError, is_unique_violation},
    models::{
        exam::{Exam, PublicExam},
        question::Question,
        result::SubmitExamRequest,
    },
    utils::jwt::Claims,
};

const EXAM_COLUMNS: &str = "id, title, subject, test_number, questions, conducted_at";

/// Compares submitted answers against the exam's answer key, index by
/// index. Comparison is case-insensitive. A submission shorter than the
/// question list leaves the tail wrong; surplus entries are ignored.
/// Returns (correct, wrong).
fn score_submission(questions: &[Question], answers: &[String]) -> (i32, i32) {
    let mut correct = 0;

    for (i, question) in questions.iter().enumerate() {
        let matched = match (answers.get(i), question.correct_answer.as_deref()) {
            (Some(given), Some(key)) => given.trim().eq_ignore_ascii_case(key),
            _ => false,
        };
        if matched {
            correct += 1;
        }
    }

    (correct, questions.len() as i32 - correct)
}

/// Lists all live exams, newest first. Correct answers are stripped from
/// every question before the payload leaves the server.
pub async fn list_active_exams(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let exams = sqlx::query_as::<_, Exam>(&format!(
        "SELECT {EXAM_COLUMNS} FROM exams ORDER BY conducted_at DESC, id DESC"
    ))
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list exams: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let public: Vec<PublicExam> = exams.into_iter().map(PublicExam::from).collect();
    Ok(Json(public))
}

/// Retrieves a single exam by ID, answers stripped.
pub async fn get_exam(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = sqlx::query_as::<_, Exam>(&format!("SELECT {EXAM_COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    Ok(Json(PublicExam::from(exam)))
}

/// Submits a student's answers for a live exam and persists the scored
/// result.
///
/// The result row snapshots student and exam identity so history stays
/// readable on its own. The unique (student, exam) index is what actually
/// enforces one attempt; the pre-check only exists to give the common
/// retry a friendly message before the insert races.
pub async fn submit_exam(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let exam = sqlx::query_as::<_, Exam>(&format!("SELECT {EXAM_COLUMNS} FROM exams WHERE id = $1"))
        .bind(req.exam_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    let student_id = claims.student_id();

    let already = sqlx::query("SELECT id FROM results WHERE student_id = $1 AND exam_id = $2")
        .bind(student_id)
        .bind(req.exam_id)
        .fetch_optional(&pool)
        .await?;
    if already.is_some() {
        return Err(AppError::Conflict(
            "You have already submitted this exam".to_string(),
        ));
    }

    let (correct, wrong) = score_submission(&exam.questions, &req.answers);
    let total = exam.questions.len() as i32;

    sqlx::query(
        r#"
        INSERT INTO results
        (student_id, student_name, student_mobile, exam_id, exam_title,
         subject, test_number, correct_count, wrong_count, score,
         total_questions, answers)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(student_id)
    .bind(&claims.name)
    .bind(&claims.mobile)
    .bind(exam.id)
    .bind(&exam.title)
    .bind(&exam.subject)
    .bind(exam.test_number)
    .bind(correct)
    .bind(wrong)
    .bind(correct)
    .bind(total)
    .bind(SqlJson(req.answers))
    .execute(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("You have already submitted this exam".to_string())
        } else {
            tracing::error!("Failed to save result: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "correct": correct,
            "wrong": wrong,
            "total": total,
            "score": correct,
            "message": "Exam submitted successfully"
        })),
    ))
}
