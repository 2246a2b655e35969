// src/models/user.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

use crate::models::stats::UserQuizAggregate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username, used in public profile URLs.
    pub username: String,

    /// Unique login email.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub first_name: String,
    pub last_name: String,
    pub branch: Option<String>,
    pub semester: Option<String>,
    pub roll_num: Option<String>,
    pub avatar_url: Option<String>,

    pub github: String,
    pub linkedin: String,
    pub instagram: String,
    pub reddit: String,
    pub discord: String,

    /// Consecutive days with at least one login.
    pub streak: i64,
    pub last_login_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account data handed to the store on registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(email(message = "Email address is not valid."))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
}

impl CreateUserRequest {
    /// Trims surrounding whitespace and lowercases the email.
    ///
    /// Validation runs on the normalized form so padding cannot satisfy the
    /// length rules.
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password: self.password,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
        }
    }
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for editing the current user's profile. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 100))]
    pub branch: Option<String>,
    #[validate(length(max = 20))]
    pub semester: Option<String>,
    #[validate(length(max = 50))]
    pub roll_num: Option<String>,
    #[validate(custom(function = validate_url_string))]
    pub avatar_url: Option<String>,
    #[validate(custom(function = validate_optional_url))]
    pub github: Option<String>,
    #[validate(custom(function = validate_optional_url))]
    pub linkedin: Option<String>,
    #[validate(custom(function = validate_optional_url))]
    pub instagram: Option<String>,
    #[validate(custom(function = validate_optional_url))]
    pub reddit: Option<String>,
    /// Discord handles are not URLs.
    #[validate(length(max = 100))]
    pub discord: Option<String>,
}

fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if url.len() > 500 {
        return Err(validator::ValidationError::new("url_too_long"));
    }
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

/// Social links may be cleared with an empty string.
fn validate_optional_url(url: &str) -> Result<(), validator::ValidationError> {
    if url.is_empty() {
        return Ok(());
    }
    validate_url_string(url)
}

/// Current user's own profile with their quiz statistics.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: User,
    pub quiz_stats: UserQuizAggregate,
}

/// Public profile page: no email, no login bookkeeping beyond the streak.
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub branch: Option<String>,
    pub semester: Option<String>,
    pub avatar_url: Option<String>,
    pub github: String,
    pub linkedin: String,
    pub instagram: String,
    pub reddit: String,
    pub discord: String,
    pub streak: i64,
    pub created_at: DateTime<Utc>,
    pub quiz_stats: UserQuizAggregate,
}

impl PublicProfile {
    pub fn new(user: User, quiz_stats: UserQuizAggregate) -> Self {
        Self {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            branch: user.branch,
            semester: user.semester,
            avatar_url: user.avatar_url,
            github: user.github,
            linkedin: user.linkedin,
            instagram: user.instagram,
            reddit: user.reddit,
            discord: user.discord,
            streak: user.streak,
            created_at: user.created_at,
            quiz_stats,
        }
    }
}
