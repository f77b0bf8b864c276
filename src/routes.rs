// src/routes.rs

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    middleware,
    routing::{delete, get, patch, post, put},
};
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{
    handlers::{army_videos, auth, drafts, exams, health, notes, results, students, videos},
    state::AppState,
    utils::jwt::auth_middleware,
};

const PDF_UPLOAD_LIMIT: usize = 20 * 1024 * 1024;
const VIDEO_UPLOAD_LIMIT: usize = 100 * 1024 * 1024;

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, students, videos, drafts, exams, ...).
/// * Applies global middleware (Trace, CORS) and rate limiting on the
///   credential-issuing routes.
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
        "http://localhost:5173".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(5)
        .finish()
        .unwrap();
    let governor_conf = Arc::new(governor_conf);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(GovernorLayer::new(governor_conf));

    let student_routes = Router::new()
        .route("/", get(students::list_students))
        .route("/{id}", delete(students::delete_student));

    let video_routes = Router::new()
        .route("/", get(videos::list_videos).post(videos::upsert_video))
        .route(
            "/{id}",
            put(videos::update_video).delete(videos::delete_video),
        );

    let draft_routes = Router::new()
        .route("/", post(drafts::create_draft).get(drafts::list_drafts))
        .route("/bulk", post(drafts::create_bulk_draft))
        .route(
            "/pdf",
            post(drafts::upload_pdf_draft).layer(DefaultBodyLimit::max(PDF_UPLOAD_LIMIT)),
        )
        .route("/{id}", put(drafts::update_draft))
        .route("/{id}/answer", patch(drafts::set_answer))
        .route("/{id}/finalize", post(drafts::finalize_draft))
        .route("/{id}/conduct", post(drafts::conduct_draft));

    let exam_routes = Router::new()
        .route("/active", get(exams::list_active_exams))
        .route("/{id}", get(exams::get_exam))
        // Protected: submissions are tied to the authenticated student
        .merge(
            Router::new()
                .route("/submit", post(exams::submit_exam))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let result_routes = Router::new()
        .route("/", get(results::list_results))
        .route("/student/{mobile}", get(results::results_by_student))
        .route("/exam/{exam_id}", get(results::results_by_exam))
        .merge(
            Router::new()
                .route("/mine", get(results::my_results))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let note_routes = Router::new()
        .route("/", post(notes::create_note).get(notes::list_notes))
        .route("/{id}", delete(notes::delete_note));

    let army_video_routes = Router::new()
        .route(
            "/",
            post(army_videos::upload_army_video).get(army_videos::list_army_videos),
        )
        .layer(DefaultBodyLimit::max(VIDEO_UPLOAD_LIMIT));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/students", student_routes)
        .nest("/api/videos", video_routes)
        .nest("/api/drafts", draft_routes)
        .nest("/api/exams", exam_routes)
        .nest("/api/results", result_routes)
        .nest("/api/notes", note_routes)
        .nest("/api/army-videos", army_video_routes)
        .route("/api/health", get(health::health_check))
        // Uploaded media is served straight off disk
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        // SPA fallback: unmatched paths get the index document
        .fallback_service(ServeFile::new("public/index.html"))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
