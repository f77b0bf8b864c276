// src/pdf.rs

use crate::error::AppError;

/// Extracts plain text from a PDF on disk by shelling out to `pdftotext`.
///
/// The tool is treated as an external collaborator: any failure (missing
/// binary, non-zero exit, empty output) surfaces as an unprocessable-input
/// error rather than a crash.
pub async fn extract_pdf_text(file_path: &str) -> Result<String, AppError> {
    let output = tokio::process::Command::new("pdftotext")
        .arg("-layout")
        .arg(file_path)
        .arg("-")
        .output()
        .await
        .map_err(|e| {
            tracing::error!("Failed to run pdftotext on {}: {}", file_path, e);
            AppError::InternalServerError(e.to_string())
        })?;

    if !output.status.success() {
        tracing::warn!(
            "pdftotext exited with {} for {}",
            output.status,
            file_path
        );
        return Err(AppError::Unprocessable(
            "Could not read the PDF. The file may be too complex or corrupted.".to_string(),
        ));
    }

    let text = String::from_utf8_lossy(&output.stdout).to_string();
    if text.trim().is_empty() {
        return Err(AppError::Unprocessable(
            "The PDF contains no extractable text.".to_string(),
        ));
    }

    Ok(text)
}
