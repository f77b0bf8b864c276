// src/handlers/army_videos.rs

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    config::Config, error::AppError, models::army_video::ArmyVideo, utils::upload::save_upload,
};

const ALLOWED_VIDEO_EXTS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Uploads a training video: multipart with a 'video' file and a 'title'
/// field. The file lands under the upload directory with a UUID name and
/// the row records the public URL it is served back from.
pub async fn upload_army_video(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut title = String::new();
    let mut file_name = String::new();
    let mut file_data: Option<Vec<u8>> = None;

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
            "video" => {
                file_name = field.file_name().unwrap_or("upload.mp4").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file_data = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    if title.trim().is_empty() {
        return Err(AppError::BadRequest("A title is required".to_string()));
    }
    let file_data =
        file_data.ok_or(AppError::BadRequest("A 'video' file field is required".to_string()))?;

    let (public_url, _) = save_upload(
        &config.upload_dir,
        "army",
        &file_name,
        ALLOWED_VIDEO_EXTS,
        &file_data,
    )
    .await?;

    let video = sqlx::query_as::<_, ArmyVideo>(
        r#"
        INSERT INTO army_videos (title, url)
        VALUES ($1, $2)
        RETURNING id, title, url, created_at
        "#,
    )
    .bind(title.trim())
    .bind(&public_url)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to save army video: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(video)))
}

/// Lists uploaded training videos, newest first.
pub async fn list_army_videos(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let videos = sqlx::query_as::<_, ArmyVideo>(
        "SELECT id, title, url, created_at FROM army_videos ORDER BY id DESC",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(videos))
}
