// src/handlers/videos.rs

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
    models::video::{UpsertVideoRequest, Video},
};

/// Lists all lesson links.
pub async fn list_videos(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let videos = sqlx::query_as::<_, Video>(
        r#"
        SELECT id, subject, class_name, video_id, title, created_at
        FROM videos
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(videos))
}

/// Creates or replaces the lesson link for a (subject, class) pair.
/// Posting the same pair twice updates the stored link in place.
pub async fn upsert_video(
    State(pool): State<PgPool>,
    Json(payload): Json<UpsertVideoRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let video = sqlx::query_as::<_, Video>(
        r#"
        INSERT INTO videos (subject, class_name, video_id, title)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (subject, class_name) DO UPDATE SET
            video_id = EXCLUDED.video_id,
            title = EXCLUDED.title
        RETURNING id, subject, class_name, video_id, title, created_at
        "#,
    )
    .bind(&payload.subject)
    .bind(&payload.class_name)
    .bind(&payload.video_id)
    .bind(&payload.title)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert video: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(video)))
}

/// Replaces a lesson link by ID.
pub async fn update_video(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpsertVideoRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query(
        r#"
        UPDATE videos
        SET subject = $1, class_name = $2, video_id = $3, title = $4
        WHERE id = $5
        "#,
    )
    .bind(&payload.subject)
    .bind(&payload.class_name)
    .bind(&payload.video_id)
    .bind(&payload.title)
    .bind(id)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a lesson link by ID.
pub async fn delete_video(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM videos WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
