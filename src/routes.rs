// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, profile, quiz, session, stats},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quizzes, sessions, stats, profile).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let quiz_routes = Router::new()
        .route("/{language}", get(quiz::list_chapters))
        .route("/{language}/{chapter}", get(quiz::get_quiz))
        // Protected quiz routes
        .merge(
            Router::new()
                .route("/{language}/{chapter}/sessions", post(session::start_session))
                .route_layer(require_auth.clone()),
        );

    let session_routes = Router::new()
        .route(
            "/{id}",
            get(session::get_session).delete(session::abandon_session),
        )
        .route("/{id}/answers", put(session::select_answer))
        .route("/{id}/navigate", post(session::navigate))
        .route("/{id}/submit", post(session::submit_session))
        .route_layer(require_auth.clone());

    let me_routes = Router::new()
        .route("/api/stats/me", get(stats::get_my_stats))
        .route("/api/attempts", get(stats::list_my_attempts))
        .route(
            "/api/profile/me",
            get(profile::get_me).put(profile::update_me),
        )
        .route_layer(require_auth);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/sessions", session_routes)
        .route("/api/users/{username}", get(profile::get_public_profile))
        .merge(me_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
