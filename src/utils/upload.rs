// src/utils/upload.rs

use std::path::Path;

use tokio::fs;
use uuid::Uuid;

use crate::error::AppError;

/// Persists an uploaded file under `<upload_dir>/<subdir>/` with a UUID
/// filename, keeping only the (allowlisted) extension from the client.
///
/// Returns `(public_url, fs_path)`: the URL is where the static-file layer
/// serves the file back; the path is where it landed on disk. UUID names
/// mean concurrent uploads never collide.
pub async fn save_upload(
    upload_dir: &str,
    subdir: &str,
    original_filename: &str,
    allowed_exts: &[&str],
    data: &[u8],
) -> Result<(String, String), AppError> {
    let ext = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "bin".to_string());

    if !allowed_exts.contains(&ext.as_str()) {
        return Err(AppError::BadRequest(format!(
            "File type .{} is not allowed",
            ext
        )));
    }

    let dir = format!("{}/{}", upload_dir.trim_end_matches('/'), subdir);
    fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let safe_filename = format!("{}.{}", Uuid::new_v4(), ext);
    let file_path = format!("{}/{}", dir, safe_filename);

    fs::write(&file_path, data).await.map_err(|e| {
        tracing::error!("Failed to write upload {}: {}", file_path, e);
        AppError::InternalServerError(format!("Failed to save file: {}", e))
    })?;

    let public_url = format!("/uploads/{}/{}", subdir, safe_filename);
    Ok((public_url, file_path))
}
