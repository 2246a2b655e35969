// tests/api_tests.rs

use std::path::PathBuf;

use quiz_backend::{config::Config, routes, state::AppState, store::InMemoryStore};

/// Writes a small quiz catalog into a fresh temp directory.
fn seed_quiz_dir() -> PathBuf {
    let root = std::env::temp_dir().join(format!("quiz-api-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(root.join("python")).unwrap();
    std::fs::write(
        root.join("python/basics.json"),
        serde_json::json!({
            "id": "basics",
            "language": "python",
            "chapter": "basics",
            "title": "Python Basics",
            "description": "Intro",
            "questions": [
                {"id": 1, "question": "Q1", "options": ["a", "b"], "correctAnswer": 1, "explanation": "E1"}
            ]
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(
        root.join("python/advanced.json"),
        serde_json::json!({
            "id": "advanced",
            "language": "python",
            "title": "Advanced Python",
            "questions": []
        })
        .to_string(),
    )
    .unwrap();
    root
}

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    let config = Config {
        database_url: None,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        quiz_data_dir: seed_quiz_dir(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        session_ttl_secs: 3600,
        persist_timeout_ms: 3000,
    };

    let state = AppState::with_store(config, InMemoryStore::new());
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

fn registration(username: &str) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "password": "password123",
        "first_name": "Ada",
        "last_name": "Lovelace"
    })
}

#[tokio::test]
async fn unknown_path_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works_and_hides_password() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&registration("ada_l"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let user: serde_json::Value = response.json().await.unwrap();
    assert_eq!(user["username"], "ada_l");
    assert_eq!(user["streak"], 0);
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn register_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Username too short
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&registration("yo"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn register_rejects_names_that_are_short_once_trimmed() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let mut padded = registration("padded");
    padded["username"] = serde_json::json!("  a  ");
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&padded)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);

    let mut blank_name = registration("blank_name");
    blank_name["first_name"] = serde_json::json!("   ");
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&blank_name)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);

    // Padding around a valid name is stripped, not rejected
    let mut spaced = registration("spaced");
    spaced["username"] = serde_json::json!("  spaced  ");
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&spaced)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    let user: serde_json::Value = response.json().await.unwrap();
    assert_eq!(user["username"], "spaced");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    for expected in [201, 409] {
        let response = client
            .post(format!("{}/api/auth/register", address))
            .json(&registration("grace"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), expected);
    }
}

#[tokio::test]
async fn login_issues_token_and_starts_streak() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/register", address))
        .json(&registration("linus"))
        .send()
        .await
        .unwrap();

    let bad = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({"email": "linus@example.com", "password": "wrong-password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status().as_u16(), 401);

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({"email": "LINUS@example.com", "password": "password123"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(login["token"].as_str().is_some());
    assert_eq!(login["type"], "Bearer");
    assert_eq!(login["streak"], 1);

    // Same-day login keeps the streak
    let again: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({"email": "linus@example.com", "password": "password123"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again["streak"], 1);
}

#[tokio::test]
async fn chapter_list_and_public_quiz() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let chapters: Vec<serde_json::Value> = client
        .get(format!("{}/api/quizzes/python", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<_> = chapters.iter().map(|c| c["chapter_id"].clone()).collect();
    assert_eq!(ids, ["advanced", "basics"]);

    let quiz: serde_json::Value = client
        .get(format!("{}/api/quizzes/python/basics", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(quiz["title"], "Python Basics");
    assert_eq!(quiz["questions"][0]["prompt"], "Q1");
    assert!(quiz["questions"][0].get("correctAnswer").is_none());
    assert!(quiz["questions"][0].get("explanation").is_none());

    let empty: Vec<serde_json::Value> = client
        .get(format!("{}/api/quizzes/cobol", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn missing_quiz_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/quizzes/rust/basics", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("rust/basics"));
}

#[tokio::test]
async fn protected_routes_require_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let no_token = client
        .get(format!("{}/api/stats/me", address))
        .send()
        .await
        .unwrap();
    assert_eq!(no_token.status().as_u16(), 401);

    let bad_token = client
        .post(format!("{}/api/quizzes/python/basics/sessions", address))
        .header("Authorization", "Bearer not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(bad_token.status().as_u16(), 401);
}
