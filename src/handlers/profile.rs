// src/handlers/profile.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{MeResponse, PublicProfile, UpdateProfileRequest},
    state::AppState,
    utils::jwt::Claims,
};

/// Get current user's profile and quiz statistics.
pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;
    let quiz_stats = state.aggregator.get_aggregate(user_id).await?;

    Ok(Json(MeResponse { user, quiz_stats }))
}

/// Partially update the current user's profile.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = state.users.update_profile(user_id, &payload).await?;
    Ok(Json(user))
}

/// Public profile page of any user, by username.
pub async fn get_public_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;
    let quiz_stats = state.aggregator.get_aggregate(user.id).await?;

    Ok(Json(PublicProfile::new(user, quiz_stats)))
}
