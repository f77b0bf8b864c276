// src/models/exam.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

use crate::models::question::{PublicQuestion, Question};

/// Represents the 'exams' table in the database.
/// Created once by conducting a draft; read-only afterward.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub title: String,
    pub subject: String,
    pub test_number: i32,
    pub questions: Json<Vec<Question>>,
    pub conducted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Exam as served to students: question answers stripped.
#[derive(Debug, Serialize)]
pub struct PublicExam {
    pub id: i64,
    pub title: String,
    pub subject: String,
    pub test_number: i32,
    pub questions: Vec<PublicQuestion>,
    pub conducted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Exam> for PublicExam {
    fn from(exam: Exam) -> Self {
        PublicExam {
            id: exam.id,
            title: exam.title,
            subject: exam.subject,
            test_number: exam.test_number,
            questions: exam.questions.iter().map(PublicQuestion::from).collect(),
            conducted_at: exam.conducted_at,
        }
    }
}
