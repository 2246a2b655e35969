// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{CreateUserRequest, LoginRequest, NewUser},
    state::AppState,
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
        streak::next_streak,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.normalized();
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let password_hash = hash_password(&payload.password)?;

    let user = state
        .users
        .create_user(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash,
            first_name: payload.first_name,
            last_name: payload.last_name,
        })
        .await?;

    tracing::info!("Registered user {} ({})", user.username, user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
///
/// A successful login also advances the daily login streak.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let invalid = || AppError::AuthError("Invalid email or password".to_string());

    let user = state
        .users
        .find_by_email(&payload.email.trim().to_lowercase())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(invalid());
    }

    let today = Utc::now().date_naive();
    let streak = next_streak(user.streak, user.last_login_date, today);
    if user.last_login_date != Some(today) || streak != user.streak {
        if let Err(e) = state.users.record_login(user.id, streak, today).await {
            tracing::warn!("Failed to update login streak for user {}: {}", user.id, e);
        }
    }

    let token = sign_jwt(
        user.id,
        &user.username,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "username": user.username,
        "streak": streak
    })))
}
