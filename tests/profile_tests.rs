// tests/profile_tests.rs

use quiz_backend::{config::Config, routes, state::AppState, store::InMemoryStore};
use serde_json::{Value, json};

async fn spawn_app() -> String {
    let quiz_dir = std::env::temp_dir().join(format!("quiz-profile-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(quiz_dir.join("c")).unwrap();
    std::fs::write(
        quiz_dir.join("c/basics.json"),
        json!({
            "id": "basics", "language": "c", "chapter": "basics", "title": "C Basics",
            "questions": [
                {"id": 1, "question": "Q1", "options": ["x", "y"], "correctAnswer": 0},
                {"id": 2, "question": "Q2", "options": ["x", "y"], "correctAnswer": 1}
            ]
        })
        .to_string(),
    )
    .unwrap();

    let config = Config {
        database_url: None,
        jwt_secret: "profile_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        quiz_data_dir: quiz_dir,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        session_ttl_secs: 3600,
        persist_timeout_ms: 3000,
    };

    let state = AppState::with_store(config, InMemoryStore::new());
    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

#[tokio::test]
async fn test_profile_flow() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let username = format!("ua_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let email = format!("{}@example.com", username);

    client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({
            "username": username,
            "email": email,
            "password": "password123",
            "first_name": "Ada",
            "last_name": "Lovelace"
        }))
        .send()
        .await
        .unwrap();

    let login: Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&json!({"email": email, "password": "password123"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = login["token"].as_str().unwrap();

    // 1. Fresh profile: streak started, zeroed stats
    let me: Value = client
        .get(format!("{}/api/profile/me", address))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["username"], username.as_str());
    assert_eq!(me["email"], email.as_str());
    assert_eq!(me["streak"], 1);
    assert_eq!(me["quiz_stats"]["total_attempts"], 0);
    assert_eq!(me["quiz_stats"]["average_score"], 0);
    assert!(me.get("password").is_none());

    // 2. Partial update
    let updated = client
        .put(format!("{}/api/profile/me", address))
        .bearer_auth(token)
        .json(&json!({
            "branch": "CSE",
            "semester": "5",
            "github": "https://github.com/ada"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status().as_u16(), 200);
    let updated: Value = updated.json().await.unwrap();
    assert_eq!(updated["branch"], "CSE");
    assert_eq!(updated["github"], "https://github.com/ada");
    assert_eq!(updated["first_name"], "Ada");

    // 3. Bad URL is rejected
    let bad = client
        .put(format!("{}/api/profile/me", address))
        .bearer_auth(token)
        .json(&json!({"linkedin": "definitely not a url"}))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status().as_u16(), 400);

    // 4. Take a quiz, then check the public profile
    let started: Value = client
        .post(format!("{}/api/quizzes/c/basics/sessions", address))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = started["session"]["session_id"].as_str().unwrap();
    client
        .put(format!("{}/api/sessions/{}/answers", address, id))
        .bearer_auth(token)
        .json(&json!({"question_index": 0, "option_index": 0}))
        .send()
        .await
        .unwrap();
    client
        .post(format!("{}/api/sessions/{}/submit", address, id))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    let public: Value = client
        .get(format!("{}/api/users/{}", address, username))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(public["first_name"], "Ada");
    assert_eq!(public["branch"], "CSE");
    assert!(public.get("email").is_none());
    assert_eq!(public["quiz_stats"]["total_attempts"], 1);
    assert_eq!(public["quiz_stats"]["average_score"], 50);
    assert_eq!(public["quiz_stats"]["language_stats"]["c"]["correct_answers"], 1);

    // 5. Unknown user
    let missing = client
        .get(format!("{}/api/users/nobody_here", address))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}
