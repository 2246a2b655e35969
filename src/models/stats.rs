// src/models/stats.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{models::attempt::NewQuizAttempt, quiz::scoring::percentage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStats {
    pub attempts: i64,
    pub correct_answers: i64,
    pub wrong_answers: i64,
}

/// Running totals of one user's quiz performance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuizAggregate {
    pub total_attempts: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub wrong_answers: i64,
    /// Derived from the totals on every change, 0..=100.
    pub average_score: i64,
    pub language_stats: BTreeMap<String, LanguageStats>,
}

impl UserQuizAggregate {
    /// Rebuilds an aggregate from stored totals, recomputing the average.
    pub fn from_totals(
        total_attempts: i64,
        total_questions: i64,
        correct_answers: i64,
        wrong_answers: i64,
        language_stats: BTreeMap<String, LanguageStats>,
    ) -> Self {
        Self {
            total_attempts,
            total_questions,
            correct_answers,
            wrong_answers,
            average_score: percentage(correct_answers, total_questions),
            language_stats,
        }
    }

    pub fn apply(&mut self, delta: &StatsDelta) {
        self.total_attempts += 1;
        self.total_questions += delta.total_questions;
        self.correct_answers += delta.correct_answers;
        self.wrong_answers += delta.wrong_answers;
        self.average_score = percentage(self.correct_answers, self.total_questions);

        let entry = self
            .language_stats
            .entry(delta.language.clone())
            .or_default();
        entry.attempts += 1;
        entry.correct_answers += delta.correct_answers;
        entry.wrong_answers += delta.wrong_answers;
    }
}

/// The additive change a single attempt makes to the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsDelta {
    pub language: String,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub wrong_answers: i64,
}

impl From<&NewQuizAttempt> for StatsDelta {
    fn from(attempt: &NewQuizAttempt) -> Self {
        Self {
            language: attempt.language.clone(),
            total_questions: attempt.total_questions,
            correct_answers: attempt.correct_answers,
            wrong_answers: attempt.wrong_answers,
        }
    }
}
