// src/models/video.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'videos' table: one lesson link per (subject, class).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    pub subject: String,
    pub class_name: String,
    /// External video identifier (e.g., a YouTube id).
    pub video_id: String,
    pub title: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating/updating a lesson link. Keyed by (subject, class_name):
/// posting the same pair again replaces the stored link.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertVideoRequest {
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(length(min = 1, max = 50))]
    pub class_name: String,
    #[validate(length(min = 1, max = 100))]
    pub video_id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}
