// src/models/result.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

/// Represents the 'results' table in the database.
///
/// One immutable record per scored attempt. Student and exam identity are
/// denormalized into the row so history stays stable independently of the
/// source rows.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub student_mobile: String,
    pub exam_id: i64,
    pub exam_title: String,
    pub subject: String,
    pub test_number: i32,
    pub correct_count: i32,
    pub wrong_count: i32,
    /// Score = number of correct answers.
    pub score: i32,
    pub total_questions: i32,
    /// Raw submitted answers, in question order.
    pub answers: Json<Vec<String>>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for submitting answers to a live exam.
#[derive(Debug, Deserialize)]
pub struct SubmitExamRequest {
    pub exam_id: i64,

    /// Ordered answers, index-aligned with the exam's questions. A list
    /// shorter than the question count leaves the tail unanswered; surplus
    /// entries are ignored.
    pub answers: Vec<String>,
}
