// src/handlers/session.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        attempt::{NewQuizAttempt, SubmitResponse},
        quiz::PublicQuiz,
    },
    quiz::session::{Navigation, QuizSession, SessionView},
    state::AppState,
    utils::jwt::Claims,
};

/// DTO for answering the question at `question_index`.
#[derive(Debug, Deserialize)]
pub struct SelectAnswerRequest {
    pub question_index: usize,
    pub option_index: usize,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session: SessionView,
    pub quiz: PublicQuiz,
}

/// Where an attempt ended up after submit.
struct PersistOutcome {
    saved: bool,
    attempt_id: Option<i64>,
    warning: Option<String>,
}

impl PersistOutcome {
    fn unsaved(warning: &str) -> Self {
        Self {
            saved: false,
            attempt_id: None,
            warning: Some(warning.to_string()),
        }
    }
}

/// Opens a quiz chapter for the current user.
///
/// Nothing is created when the chapter does not exist.
pub async fn start_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((language, chapter_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let definition = Arc::new(state.catalog.load(&language, &chapter_id).await?);
    let quiz = PublicQuiz::from(definition.as_ref());

    let now = Utc::now();
    let id = state
        .sessions
        .insert(QuizSession::start(definition, user_id, now), now)
        .await;
    let session = state
        .sessions
        .with_session(id, user_id, |s| Ok(SessionView::new(id, s, now)))
        .await?;

    tracing::debug!("User {} started {}/{} as {}", user_id, language, chapter_id, id);
    Ok((StatusCode::CREATED, Json(StartSessionResponse { session, quiz })))
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let now = Utc::now();
    let view = state
        .sessions
        .with_session(id, user_id, |s| Ok(SessionView::new(id, s, now)))
        .await?;
    Ok(Json(view))
}

/// Records or overwrites an answer. Nothing is persisted until submit.
pub async fn select_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let now = Utc::now();
    let view = state
        .sessions
        .with_session(id, user_id, |s| {
            s.select_answer(req.question_index, req.option_index, now)?;
            Ok(SessionView::new(id, s, now))
        })
        .await?;
    Ok(Json(view))
}

pub async fn navigate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(nav): Json<Navigation>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let now = Utc::now();
    let view = state
        .sessions
        .with_session(id, user_id, |s| {
            s.navigate(nav, now)?;
            Ok(SessionView::new(id, s, now))
        })
        .await?;
    Ok(Json(view))
}

/// Scores the session and records the attempt.
///
/// The score is computed before anything is written, and a storage failure
/// only turns into `saved: false` plus a warning. A second submit while the
/// first is still saving is 409; afterwards the session is gone.
pub async fn submit_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let submitted_at = Utc::now();

    let (attempt, mut session) = state
        .sessions
        .with_session(id, user_id, |s| {
            let attempt = s.submit(submitted_at)?;
            Ok((attempt, s.clone()))
        })
        .await?;

    let outcome = persist_attempt(&state, id, attempt.clone()).await;
    session.finish(Utc::now())?;

    Ok(Json(SubmitResponse {
        language: attempt.language,
        chapter_id: attempt.chapter_id,
        chapter_title: attempt.chapter_title,
        score: attempt.score,
        total_questions: attempt.total_questions,
        correct_answers: attempt.correct_answers,
        wrong_answers: attempt.wrong_answers,
        percentage: attempt.percentage,
        time_spent_seconds: attempt.time_spent_seconds,
        review: session.review(),
        saved: outcome.saved,
        attempt_id: outcome.attempt_id,
        warning: outcome.warning,
    }))
}

/// Leaves a quiz without submitting. The session is discarded.
pub async fn abandon_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    state.sessions.remove(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Saves on a spawned task so a dropped request cannot cancel the write,
/// and waits at most the configured timeout for it.
///
/// The task also discards the submitting session once the write settles, so
/// the session leaves the registry even if the client has gone away.
async fn persist_attempt(state: &AppState, session_id: Uuid, attempt: NewQuizAttempt) -> PersistOutcome {
    let aggregator = state.aggregator.clone();
    let sessions = state.sessions.clone();
    let user_id = attempt.user_id;
    let task = tokio::spawn(async move {
        let result = aggregator.record_attempt(&attempt).await;
        if sessions.remove(session_id, user_id).await.is_err() {
            tracing::debug!("Session {} was discarded while submitting", session_id);
        }
        result
    });

    match tokio::time::timeout(state.config.persist_timeout(), task).await {
        Ok(Ok(Ok(saved))) => PersistOutcome {
            saved: true,
            attempt_id: Some(saved.id),
            warning: None,
        },
        Ok(Ok(Err(e))) => {
            tracing::warn!("Failed to save quiz attempt for user {}: {}", user_id, e);
            PersistOutcome::unsaved("Error saving quiz results. But you can still see your results!")
        }
        Ok(Err(e)) => {
            tracing::warn!("Quiz attempt save task for user {} aborted: {}", user_id, e);
            PersistOutcome::unsaved("Error saving quiz results. But you can still see your results!")
        }
        Err(_) => {
            tracing::warn!("Saving quiz attempt for user {} is taking too long", user_id);
            PersistOutcome::unsaved("Your results are still being saved.")
        }
    }
}
