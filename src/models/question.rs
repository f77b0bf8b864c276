// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single question, embedded as JSONB inside drafts and exams.
///
/// `correct_answer` stays `None` until explicitly set; questions coming out
/// of the PDF extractor always start unanswered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,

    /// Ordered option strings (e.g., ["Option A", "Option B", ...]).
    pub options: Vec<String>,

    /// Correct option letter 'A'..'D', uppercase once set.
    pub correct_answer: Option<String>,
}

/// Question as served to students: the answer is stripped.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub text: String,
    pub options: Vec<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        PublicQuestion {
            text: q.text.clone(),
            options: q.options.clone(),
        }
    }
}

/// DTO for a question supplied by the manual/bulk authoring paths.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct QuestionInput {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
}

impl QuestionInput {
    pub fn into_question(self) -> Question {
        Question {
            text: self.text,
            options: self.options,
            correct_answer: self.correct_answer.map(|a| a.to_uppercase()),
        }
    }
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() < 2 {
        return Err(validator::ValidationError::new("need_at_least_two_options"));
    }
    for opt in options {
        if opt.is_empty() || opt.len() > 500 {
            return Err(validator::ValidationError::new("option_length_invalid"));
        }
    }
    Ok(())
}
