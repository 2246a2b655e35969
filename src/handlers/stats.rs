// src/handlers/stats.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{error::AppError, models::attempt::AttemptFilter, state::AppState, utils::jwt::Claims};

/// Current user's running quiz totals. All zeros before the first attempt.
pub async fn get_my_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let stats = state.aggregator.get_aggregate(user_id).await?;
    Ok(Json(stats))
}

/// Current user's attempts, newest first, optionally narrowed by
/// `?language=` and `?chapter_id=`.
pub async fn list_my_attempts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<AttemptFilter>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let attempts = state.aggregator.get_attempts(user_id, &filter).await?;
    Ok(Json(attempts))
}
