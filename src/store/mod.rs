// src/store/mod.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{
    attempt::{AttemptFilter, NewQuizAttempt, QuizAttempt},
    stats::{StatsDelta, UserQuizAggregate},
    user::{NewUser, UpdateProfileRequest, User},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `StoreError::Conflict` when the username or email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Applies the present fields and refreshes `updated_at`.
    async fn update_profile(&self, id: i64, update: &UpdateProfileRequest) -> Result<User, StoreError>;

    async fn record_login(&self, id: i64, streak: i64, date: NaiveDate) -> Result<(), StoreError>;
}

/// Append-only attempt log.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    async fn append_attempt(&self, attempt: &NewQuizAttempt) -> Result<QuizAttempt, StoreError>;

    /// Newest first.
    async fn list_attempts(
        &self,
        user_id: i64,
        filter: &AttemptFilter,
    ) -> Result<Vec<QuizAttempt>, StoreError>;
}

/// Per-user running totals.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Adds `delta` to the user's totals and language entry as one atomic step.
    async fn apply_delta(&self, user_id: i64, delta: &StatsDelta) -> Result<(), StoreError>;

    /// `None` until the first attempt is recorded.
    async fn get_aggregate(&self, user_id: i64) -> Result<Option<UserQuizAggregate>, StoreError>;
}
