// src/models/army_video.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'army_videos' table: uploaded training videos.
/// `url` is the public path under which the stored file is served.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ArmyVideo {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
