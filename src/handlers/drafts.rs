// src/handlers/drafts.rs

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::{PgPool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    extractor,
    models::{
        draft::{
            CreateDraftRequest, Draft, ORIGIN_BULK, ORIGIN_MANUAL, ORIGIN_PDF, SetAnswerRequest,
        },
        exam::Exam,
        question::Question,
    },
    pdf,
    utils::upload::save_upload,
};

const DRAFT_COLUMNS: &str = "id, title, subject, test_number, origin, questions, created_at";

/// Normalizes and checks a correct-answer letter. Only A-D are meaningful
/// against a 4-option question list.
fn normalize_answer_letter(answer: &str) -> Result<String, AppError> {
    let letter = answer.trim().to_uppercase();
    match letter.as_str() {
        "A" | "B" | "C" | "D" => Ok(letter),
        _ => Err(AppError::BadRequest(
            "Answer must be a single letter A-D".to_string(),
        )),
    }
}

async fn insert_draft(
    pool: &PgPool,
    title: &str,
    subject: &str,
    test_number: i32,
    origin: &str,
    questions: Vec<Question>,
) -> Result<Draft, AppError> {
    let draft = sqlx::query_as::<_, Draft>(&format!(
        r#"
        INSERT INTO drafts (title, subject, test_number, origin, questions)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {DRAFT_COLUMNS}
        "#
    ))
    .bind(title)
    .bind(subject)
    .bind(test_number)
    .bind(origin)
    .bind(SqlJson(questions))
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert draft: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(draft)
}

async fn fetch_draft(pool: &PgPool, id: i64) -> Result<Draft, AppError> {
    sqlx::query_as::<_, Draft>(&format!("SELECT {DRAFT_COLUMNS} FROM drafts WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Draft not found".to_string()))
}

/// Manual intake: a fully-formed question list.
///
/// Every question must already carry its correct answer. Returns the new
/// draft with its id; later edits go through that id, never through a
/// title lookup.
pub async fn create_draft(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateDraftRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    for (i, q) in payload.questions.iter().enumerate() {
        let answer = q.correct_answer.as_deref().ok_or_else(|| {
            AppError::BadRequest(format!("Question {} is missing its correct answer", i))
        })?;
        normalize_answer_letter(answer)?;
    }

    let (title, subject, test_number) =
        (payload.title.clone(), payload.subject.clone(), payload.test_number);
    let draft = insert_draft(
        &pool,
        &title,
        &subject,
        test_number,
        ORIGIN_MANUAL,
        payload.into_questions(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(draft)))
}

/// Bulk-paste intake: the client has already structured the pasted text
/// into questions; the server only validates and persists. Answers may
/// still be missing here; conducting gates on full coverage.
pub async fn create_bulk_draft(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateDraftRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    for q in &payload.questions {
        if let Some(answer) = q.correct_answer.as_deref() {
            normalize_answer_letter(answer)?;
        }
    }

    let (title, subject, test_number) =
        (payload.title.clone(), payload.subject.clone(), payload.test_number);
    let draft = insert_draft(
        &pool,
        &title,
        &subject,
        test_number,
        ORIGIN_BULK,
        payload.into_questions(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(draft)))
}

/// Replaces an existing draft's fields by id.
pub async fn update_draft(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateDraftRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    for q in &payload.questions {
        if let Some(answer) = q.correct_answer.as_deref() {
            normalize_answer_letter(answer)?;
        }
    }

    let (title, subject, test_number) =
        (payload.title.clone(), payload.subject.clone(), payload.test_number);
    let result = sqlx::query(
        r#"
        UPDATE drafts
        SET title = $1, subject = $2, test_number = $3, questions = $4
        WHERE id = $5
        "#,
    )
    .bind(title)
    .bind(subject)
    .bind(test_number)
    .bind(SqlJson(payload.into_questions()))
    .bind(id)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Draft not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Lists all drafts, newest first. Drafts are an authoring surface, so
/// answers stay in the payload.
pub async fn list_drafts(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let drafts =
        sqlx::query_as::<_, Draft>(&format!("SELECT {DRAFT_COLUMNS} FROM drafts ORDER BY id DESC"))
            .fetch_all(&pool)
            .await?;

    Ok(Json(drafts))
}

/// PDF intake: multipart upload with a 'pdf' file plus title, subject and
/// test_number fields.
///
/// The PDF's text is extracted and run through the question heuristics.
/// If nothing survives, the response is a 422 carrying the lines the
/// scanner could not place, so the author sees what went wrong instead of
/// an opaque failure. On success the draft is stored with every answer
/// unset, to be filled in via set-answer.
pub async fn upload_pdf_draft(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut title = String::new();
    let mut subject = String::new();
    let mut test_number: Option<i32> = None;
    let mut pdf_name = String::new();
    let mut pdf_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "title" => {
                title = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "subject" => {
                subject = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "testNumber" | "test_number" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                test_number = raw.trim().parse().ok();
            }
            "pdf" => {
                pdf_name = field.file_name().unwrap_or("upload.pdf").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                pdf_data = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    if title.trim().is_empty() || subject.trim().is_empty() {
        return Err(AppError::BadRequest(
            "title and subject are required".to_string(),
        ));
    }
    let test_number = test_number
        .filter(|n| *n >= 1)
        .ok_or(AppError::BadRequest("A valid testNumber is required".to_string()))?;
    let pdf_data =
        pdf_data.ok_or(AppError::BadRequest("A 'pdf' file field is required".to_string()))?;

    if !pdf_data.starts_with(b"%PDF") {
        return Err(AppError::BadRequest("Invalid PDF file content".to_string()));
    }

    let (_, file_path) =
        save_upload(&config.upload_dir, "pdfs", &pdf_name, &["pdf"], &pdf_data).await?;

    let text = pdf::extract_pdf_text(&file_path).await?;
    let report = extractor::extract_questions(&text);

    if report.questions.is_empty() {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "No questions could be extracted from the PDF",
                "unparsed_lines": report.unparsed_lines,
            })),
        )
            .into_response());
    }

    let draft = insert_draft(
        &pool,
        title.trim(),
        subject.trim(),
        test_number,
        ORIGIN_PDF,
        report.questions,
    )
    .await?;

    tracing::info!(
        "PDF draft {} created with {} questions ({} unparsed lines)",
        draft.id,
        draft.questions.len(),
        report.unparsed_lines.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "draft_id": draft.id,
            "question_count": draft.questions.len(),
            "unparsed_lines": report.unparsed_lines,
        })),
    )
        .into_response())
}

/// Sets the correct answer for one question of a draft.
pub async fn set_answer(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<SetAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let letter = normalize_answer_letter(&payload.answer)?;

    let mut draft = fetch_draft(&pool, id).await?;

    let question = draft
        .questions
        .0
        .get_mut(payload.question_index)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Question index {} is out of range",
                payload.question_index
            ))
        })?;
    question.correct_answer = Some(letter.clone());

    sqlx::query("UPDATE drafts SET questions = $1 WHERE id = $2")
        .bind(SqlJson(draft.questions.0))
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(Json(json!({
        "question_index": payload.question_index,
        "answer": letter,
    })))
}

/// Promotes a PDF-origin draft to a standard draft once every question has
/// its correct answer set.
pub async fn finalize_draft(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let draft = fetch_draft(&pool, id).await?;

    if draft.origin != ORIGIN_PDF {
        return Err(AppError::BadRequest(
            "Only PDF-origin drafts can be finalized".to_string(),
        ));
    }

    let unanswered = draft.unanswered_indices();
    if !unanswered.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Questions without a correct answer: {:?}",
            unanswered
        )));
    }

    sqlx::query("UPDATE drafts SET origin = $1 WHERE id = $2")
        .bind(ORIGIN_MANUAL)
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(Json(json!({ "draft_id": id, "status": "finalized" })))
}

/// Conducts a draft: the one-way promotion into a live exam.
///
/// The draft row is deleted and the exam inserted in a single transaction,
/// so the promotion is one-shot: of two concurrent conducts, the loser
/// sees no draft row (404) or hits the (title, test_number) unique index
/// (409). No check-then-act window.
pub async fn conduct_draft(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await?;

    let draft = sqlx::query_as::<_, Draft>(&format!(
        "DELETE FROM drafts WHERE id = $1 RETURNING {DRAFT_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Draft not found".to_string()))?;

    // Returning an error here drops the transaction, so the draft survives.
    let unanswered = draft.unanswered_indices();
    if !unanswered.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Cannot conduct: questions without a correct answer: {:?}",
            unanswered
        )));
    }

    let exam = sqlx::query_as::<_, Exam>(
        r#"
        INSERT INTO exams (title, subject, test_number, questions)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, subject, test_number, questions, conducted_at
        "#,
    )
    .bind(&draft.title)
    .bind(&draft.subject)
    .bind(draft.test_number)
    .bind(&draft.questions)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!(
                "An exam titled '{}' with test number {} was already conducted",
                draft.title, draft.test_number
            ))
        } else {
            tracing::error!("Failed to conduct draft {}: {:?}", id, e);
            AppError::from(e)
        }
    })?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "exam_id": exam.id,
            "title": exam.title,
            "question_count": exam.questions.len(),
        })),
    ))
}
