// src/handlers/notes.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::note::{CreateNoteRequest, Note},
};

/// Creates a study note.
///
/// Content is whitelist-sanitized with ammonia before storage as a
/// fail-safe against stored XSS from the note-authoring client.
pub async fn create_note(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let clean_content = ammonia::clean(&payload.content);

    let note = sqlx::query_as::<_, Note>(
        r#"
        INSERT INTO notes (title, content)
        VALUES ($1, $2)
        RETURNING id, title, content, created_at
        "#,
    )
    .bind(&payload.title)
    .bind(&clean_content)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create note: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(note)))
}

/// Lists all notes, newest first.
pub async fn list_notes(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let notes = sqlx::query_as::<_, Note>(
        "SELECT id, title, content, created_at FROM notes ORDER BY id DESC",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(notes))
}

/// Deletes a note by ID.
pub async fn delete_note(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Note not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
