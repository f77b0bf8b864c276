// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    models::student::{LoginRequest, RegisterRequest, Student},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new student.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the student object (excluding password).
pub async fn register(
    State(pool): State<PgPool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let student = sqlx::query_as::<_, Student>(
        r#"
        INSERT INTO students (name, roll_number, mobile, password)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, roll_number, mobile, password, created_at
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.roll_number)
    .bind(&payload.mobile)
    .bind(&hashed_password)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Mobile '{}' is already registered", payload.mobile))
        } else {
            tracing::error!("Failed to register student: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(student)))
}

/// Authenticates a student and returns a JWT token.
///
/// Unknown mobile and wrong password produce the same generic 401 so the
/// endpoint cannot be used to enumerate registered numbers.
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let student = sqlx::query_as::<_, Student>(
        r#"
        SELECT id, name, roll_number, mobile, password, created_at
        FROM students
        WHERE mobile = $1
        "#,
    )
    .bind(&payload.mobile)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let invalid = || AppError::AuthError("Invalid credentials".to_string());
    let student = student.ok_or_else(invalid)?;

    if !verify_password(&payload.password, &student.password)? {
        return Err(invalid());
    }

    let token = sign_jwt(
        student.id,
        &student.mobile,
        &student.name,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "name": student.name,
    })))
}
