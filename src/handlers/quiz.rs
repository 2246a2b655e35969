// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{error::AppError, models::quiz::PublicQuiz, state::AppState};

/// Lists the chapter quizzes available for a language track.
pub async fn list_chapters(
    State(state): State<AppState>,
    Path(language): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let chapters = state.catalog.list_chapters(&language).await?;
    Ok(Json(chapters))
}

/// Returns one chapter quiz without its answer key.
///
/// 404 when no definition exists for the language/chapter pair.
pub async fn get_quiz(
    State(state): State<AppState>,
    Path((language, chapter_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let definition = state.catalog.load(&language, &chapter_id).await?;
    Ok(Json(PublicQuiz::from(&definition)))
}
