// src/models/draft.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::models::question::{Question, QuestionInput};

/// Where a draft's questions came from.
pub const ORIGIN_MANUAL: &str = "manual";
pub const ORIGIN_BULK: &str = "bulk";
pub const ORIGIN_PDF: &str = "pdf";

/// Represents the 'drafts' table in the database.
/// A draft is an exam-in-progress, not yet visible to students.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Draft {
    pub id: i64,

    pub title: String,

    pub subject: String,

    pub test_number: i32,

    /// 'manual', 'bulk' or 'pdf'. PDF-origin drafts start with every
    /// question unanswered and must be answered before promotion.
    pub origin: String,

    /// Ordered question list, stored as a JSONB array.
    pub questions: Json<Vec<Question>>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Draft {
    /// Indices of questions whose correct answer is still unset.
    pub fn unanswered_indices(&self) -> Vec<usize> {
        self.questions
            .iter()
            .enumerate()
            .filter(|(_, q)| q.correct_answer.is_none())
            .map(|(i, _)| i)
            .collect()
    }
}

/// DTO for creating or replacing a draft (manual and bulk paths).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDraftRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(range(min = 1))]
    pub test_number: i32,
    #[validate(length(min = 1, message = "A draft needs at least one question."), nested)]
    pub questions: Vec<QuestionInput>,
}

impl CreateDraftRequest {
    pub fn into_questions(self) -> Vec<Question> {
        self.questions
            .into_iter()
            .map(QuestionInput::into_question)
            .collect()
    }
}

/// DTO for setting one question's correct answer on a draft.
#[derive(Debug, Deserialize)]
pub struct SetAnswerRequest {
    pub question_index: usize,
    pub answer: String,
}
