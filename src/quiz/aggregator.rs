// src/quiz/aggregator.rs

use std::sync::Arc;

use crate::{
    models::{
        attempt::{AttemptFilter, NewQuizAttempt, QuizAttempt},
        stats::{StatsDelta, UserQuizAggregate},
    },
    store::{AttemptRepository, StatsRepository, StoreError},
};

/// Records attempts and keeps each user's running totals.
#[derive(Clone)]
pub struct StatsAggregator {
    attempts: Arc<dyn AttemptRepository>,
    stats: Arc<dyn StatsRepository>,
}

impl StatsAggregator {
    pub fn new(attempts: Arc<dyn AttemptRepository>, stats: Arc<dyn StatsRepository>) -> Self {
        Self { attempts, stats }
    }

    /// Appends the attempt, then adds it to the user's aggregate.
    ///
    /// If the aggregate update fails the attempt row stays; nothing is rolled back.
    pub async fn record_attempt(&self, attempt: &NewQuizAttempt) -> Result<QuizAttempt, StoreError> {
        let saved = self.attempts.append_attempt(attempt).await?;

        let delta = StatsDelta::from(attempt);
        if let Err(e) = self.stats.apply_delta(attempt.user_id, &delta).await {
            tracing::error!(
                "Attempt {} saved but stats update failed for user {}: {}",
                saved.id,
                attempt.user_id,
                e
            );
            return Err(e);
        }

        tracing::info!(
            user_id = attempt.user_id,
            language = %attempt.language,
            chapter = %attempt.chapter_id,
            percentage = attempt.percentage,
            "Recorded quiz attempt {}",
            saved.id
        );
        Ok(saved)
    }

    /// Zero-valued aggregate when the user has no attempts yet.
    pub async fn get_aggregate(&self, user_id: i64) -> Result<UserQuizAggregate, StoreError> {
        Ok(self.stats.get_aggregate(user_id).await?.unwrap_or_default())
    }

    pub async fn get_attempts(
        &self,
        user_id: i64,
        filter: &AttemptFilter,
    ) -> Result<Vec<QuizAttempt>, StoreError> {
        self.attempts.list_attempts(user_id, filter).await
    }
}
