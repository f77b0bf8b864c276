// tests/api_tests.rs

use academy_backend::{config::Config, routes, state::AppState};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // Note: For Postgres, you must have a running database.
    // We'll read from DATABASE_URL environment variable.
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        port: 0,
        upload_dir: "./test-uploads".to_string(),
        rust_log: "error".to_string(),
    };

    let state = AppState { pool, config };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // Spawn the server in the background. Connect info is required by the
    // per-IP rate limiter on the auth routes.
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    address
}

/// Unique mobile number for this test run.
fn unique_mobile() -> String {
    format!("m_{}", &uuid::Uuid::new_v4().to_string()[..8])
}

/// Unique exam/draft title for this test run. Conducted exams are unique
/// on (title, test_number), so titles must not collide across runs.
fn unique_title(prefix: &str) -> String {
    format!("{} {}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

/// Registers a fresh student and logs them in.
/// Returns (token, mobile).
async fn register_and_login(client: &reqwest::Client, address: &str) -> (String, String) {
    let mobile = unique_mobile();

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "name": "Test Student",
            "roll_number": "R-101",
            "mobile": mobile,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(response.status().as_u16(), 201);

    let login_resp = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "mobile": mobile,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Login failed")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login json");

    let token = login_resp["token"].as_str().expect("Token not found").to_string();
    (token, mobile)
}

/// A two-question draft payload with answers A and B.
fn answered_draft(title: &str, test_number: i32) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "subject": "General Knowledge",
        "test_number": test_number,
        "questions": [
            {
                "text": "First question?",
                "options": ["right", "wrong", "wrong", "wrong"],
                "correct_answer": "A"
            },
            {
                "text": "Second question?",
                "options": ["wrong", "right", "wrong", "wrong"],
                "correct_answer": "B"
            }
        ]
    })
}

#[tokio::test]
async fn health_check_works() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/api/health", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_then_login_returns_display_name() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let mobile = unique_mobile();

    // Act: register, then log in with the same credentials
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "name": "Asha K",
            "roll_number": "R-7",
            "mobile": mobile,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "mobile": mobile,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(login["name"], "Asha K");
    assert_eq!(login["type"], "Bearer");
    assert!(login["token"].as_str().is_some());
}

#[tokio::test]
async fn register_reusing_mobile_conflicts() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let mobile = unique_mobile();
    let payload = serde_json::json!({
        "name": "First",
        "roll_number": "R-1",
        "mobile": mobile,
        "password": "password123"
    });

    // Act
    let first = client
        .post(format!("{}/api/auth/register", address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to execute request");
    let second = client
        .post(format!("{}/api/auth/register", address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(first.status().as_u16(), 201);
    assert_eq!(second.status().as_u16(), 409);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (_token, mobile) = register_and_login(&client, &address).await;

    // Act
    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "mobile": mobile,
            "password": "not-the-password"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert: generic 401, never a server error
    assert_eq!(response.status().as_u16(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn register_fails_validation() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: password is too short
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "name": "X",
            "roll_number": "R-1",
            "mobile": unique_mobile(),
            "password": "abc"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn manual_draft_requires_all_answers() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: second question has no correct_answer
    let response = client
        .post(format!("{}/api/drafts", address))
        .json(&serde_json::json!({
            "title": unique_title("Incomplete"),
            "subject": "Maths",
            "test_number": 1,
            "questions": [
                { "text": "Q1?", "options": ["a", "b", "c"], "correct_answer": "A" },
                { "text": "Q2?", "options": ["a", "b", "c"] }
            ]
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn full_exam_flow_conduct_submit_results() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, mobile) = register_and_login(&client, &address).await;
    let title = unique_title("Weekly Test");

    // 1. Author a manual draft
    let draft: serde_json::Value = client
        .post(format!("{}/api/drafts", address))
        .json(&answered_draft(&title, 1))
        .send()
        .await
        .expect("Draft creation failed")
        .json()
        .await
        .unwrap();
    let draft_id = draft["id"].as_i64().expect("Draft id missing");

    // 2. Conduct it
    let conducted: serde_json::Value = client
        .post(format!("{}/api/drafts/{}/conduct", address, draft_id))
        .send()
        .await
        .expect("Conduct failed")
        .json()
        .await
        .unwrap();
    let exam_id = conducted["exam_id"].as_i64().expect("Exam id missing");

    // 3. The draft is gone: conducting again is a 404
    let again = client
        .post(format!("{}/api/drafts/{}/conduct", address, draft_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(again.status().as_u16(), 404);

    // 4. Delivery hides answers
    let exam: serde_json::Value = client
        .get(format!("{}/api/exams/{}", address, exam_id))
        .send()
        .await
        .expect("Fetch exam failed")
        .json()
        .await
        .unwrap();
    let questions = exam["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    for q in questions {
        assert!(q.get("correct_answer").is_none(), "answers must be stripped");
    }

    // 5. Submit: lowercase 'a' is correct (case-insensitive), 'X' is wrong
    let scored: serde_json::Value = client
        .post(format!("{}/api/exams/submit", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "exam_id": exam_id, "answers": ["a", "X"] }))
        .send()
        .await
        .expect("Submit failed")
        .json()
        .await
        .unwrap();
    assert_eq!(scored["correct"], 1);
    assert_eq!(scored["wrong"], 1);
    assert_eq!(scored["total"], 2);
    assert_eq!(scored["score"], 1);

    // 6. Second submission for the same exam is rejected
    let duplicate = client
        .post(format!("{}/api/exams/submit", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "exam_id": exam_id, "answers": ["A", "B"] }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(duplicate.status().as_u16(), 409);

    // 7. The result shows up under the student's own results
    let mine: serde_json::Value = client
        .get(format!("{}/api/results/mine", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Fetch results failed")
        .json()
        .await
        .unwrap();
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["exam_title"], title.as_str());
    assert_eq!(mine[0]["student_mobile"], mobile.as_str());
    assert_eq!(mine[0]["correct_count"], 1);
}

#[tokio::test]
async fn conduct_rejects_unanswered_draft_until_answers_set() {
    // Arrange: a bulk draft whose second question has no answer yet
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let title = unique_title("Bulk Paste");

    let draft: serde_json::Value = client
        .post(format!("{}/api/drafts/bulk", address))
        .json(&serde_json::json!({
            "title": title,
            "subject": "Science",
            "test_number": 2,
            "questions": [
                { "text": "Q1?", "options": ["x", "y", "z"], "correct_answer": "C" },
                { "text": "Q2?", "options": ["x", "y", "z"] }
            ]
        }))
        .send()
        .await
        .expect("Bulk draft failed")
        .json()
        .await
        .unwrap();
    let draft_id = draft["id"].as_i64().unwrap();

    // Act 1: conducting now must fail
    let premature = client
        .post(format!("{}/api/drafts/{}/conduct", address, draft_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(premature.status().as_u16(), 400);

    // Act 2: set the missing answer, then conduct
    let set = client
        .patch(format!("{}/api/drafts/{}/answer", address, draft_id))
        .json(&serde_json::json!({ "question_index": 1, "answer": "b" }))
        .send()
        .await
        .expect("Set answer failed");
    assert_eq!(set.status().as_u16(), 200);

    let conducted = client
        .post(format!("{}/api/drafts/{}/conduct", address, draft_id))
        .send()
        .await
        .expect("Conduct failed");

    // Assert
    assert_eq!(conducted.status().as_u16(), 201);
}

#[tokio::test]
async fn set_answer_rejects_out_of_range_index() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let draft: serde_json::Value = client
        .post(format!("{}/api/drafts/bulk", address))
        .json(&serde_json::json!({
            "title": unique_title("Tiny"),
            "subject": "Science",
            "test_number": 3,
            "questions": [
                { "text": "Q1?", "options": ["x", "y", "z"] }
            ]
        }))
        .send()
        .await
        .expect("Bulk draft failed")
        .json()
        .await
        .unwrap();
    let draft_id = draft["id"].as_i64().unwrap();

    // Act
    let response = client
        .patch(format!("{}/api/drafts/{}/answer", address, draft_id))
        .json(&serde_json::json!({ "question_index": 5, "answer": "A" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn conducting_same_title_twice_conflicts() {
    // Arrange: two drafts with identical (title, test_number)
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let title = unique_title("Repeated");

    let mut ids = Vec::new();
    for _ in 0..2 {
        let draft: serde_json::Value = client
            .post(format!("{}/api/drafts", address))
            .json(&answered_draft(&title, 4))
            .send()
            .await
            .expect("Draft creation failed")
            .json()
            .await
            .unwrap();
        ids.push(draft["id"].as_i64().unwrap());
    }

    // Act
    let first = client
        .post(format!("{}/api/drafts/{}/conduct", address, ids[0]))
        .send()
        .await
        .expect("Failed to execute request");
    let second = client
        .post(format!("{}/api/drafts/{}/conduct", address, ids[1]))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert: the unique (title, test_number) index rejects the second
    assert_eq!(first.status().as_u16(), 201);
    assert_eq!(second.status().as_u16(), 409);
}

#[tokio::test]
async fn submit_requires_bearer_token() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: no Authorization header
    let response = client
        .post(format!("{}/api/exams/submit", address))
        .json(&serde_json::json!({ "exam_id": 1, "answers": ["A"] }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn video_upsert_replaces_by_subject_and_class() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let subject = unique_title("Subject");

    // Act: post the same (subject, class) twice with different links
    let first: serde_json::Value = client
        .post(format!("{}/api/videos", address))
        .json(&serde_json::json!({
            "subject": subject,
            "class_name": "10A",
            "video_id": "vid-one",
            "title": "Lesson 1"
        }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    let second: serde_json::Value = client
        .post(format!("{}/api/videos", address))
        .json(&serde_json::json!({
            "subject": subject,
            "class_name": "10A",
            "video_id": "vid-two",
            "title": "Lesson 1 (revised)"
        }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    // Assert: same row, updated link
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["video_id"], "vid-two");
}

#[tokio::test]
async fn notes_content_is_sanitized() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let note: serde_json::Value = client
        .post(format!("{}/api/notes", address))
        .json(&serde_json::json!({
            "title": unique_title("Note"),
            "content": "<p>Keep this</p><script>alert('xss')</script>"
        }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    // Assert: the script tag never reaches the store
    let content = note["content"].as_str().unwrap();
    assert!(content.contains("Keep this"));
    assert!(!content.contains("<script>"));
}
