// src/handlers/health.rs

use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Liveness check. No auth, no store access.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
