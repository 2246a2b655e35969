// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// Wire and storage value of a question left unanswered.
pub const UNANSWERED: i64 = -1;

/// Per-question outcome stored with every attempt, unanswered ones included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerDetail {
    pub question_id: i64,
    /// Selected option index, or `UNANSWERED`.
    pub selected_answer: i64,
    pub correct_answer: i64,
    pub is_correct: bool,
}

/// A scored attempt that has not been written yet.
#[derive(Debug, Clone, Serialize)]
pub struct NewQuizAttempt {
    pub user_id: i64,
    pub language: String,
    pub chapter_id: String,
    pub chapter_title: String,
    /// One point per correct answer.
    pub score: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub wrong_answers: i64,
    pub percentage: i64,
    pub answers: Vec<AnswerDetail>,
    pub attempted_at: DateTime<Utc>,
    pub time_spent_seconds: i64,
}

/// Represents the 'quiz_attempts' table. Rows are never updated or deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub language: String,
    pub chapter_id: String,
    pub chapter_title: String,
    pub score: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub wrong_answers: i64,
    pub percentage: i64,
    pub answers: Json<Vec<AnswerDetail>>,
    #[serde(rename = "timestamp")]
    pub attempted_at: DateTime<Utc>,
    pub time_spent_seconds: i64,
}

impl QuizAttempt {
    pub fn from_new(id: i64, attempt: &NewQuizAttempt) -> Self {
        Self {
            id,
            user_id: attempt.user_id,
            language: attempt.language.clone(),
            chapter_id: attempt.chapter_id.clone(),
            chapter_title: attempt.chapter_title.clone(),
            score: attempt.score,
            total_questions: attempt.total_questions,
            correct_answers: attempt.correct_answers,
            wrong_answers: attempt.wrong_answers,
            percentage: attempt.percentage,
            answers: Json(attempt.answers.clone()),
            attempted_at: attempt.attempted_at,
            time_spent_seconds: attempt.time_spent_seconds,
        }
    }
}

/// Query parameters for listing attempts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttemptFilter {
    pub language: Option<String>,
    pub chapter_id: Option<String>,
}

impl AttemptFilter {
    pub fn matches(&self, attempt: &QuizAttempt) -> bool {
        self.language
            .as_deref()
            .is_none_or(|lang| attempt.language == lang)
            && self
                .chapter_id
                .as_deref()
                .is_none_or(|chapter| attempt.chapter_id == chapter)
    }
}

/// A question as shown on the results screen, answer and explanation revealed.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionReview {
    pub question_id: i64,
    pub prompt: String,
    pub options: Vec<String>,
    pub selected_answer: i64,
    pub correct_answer: i64,
    pub is_correct: bool,
    pub explanation: String,
}

/// DTO returned by a submit.
///
/// Scoring is always present; `saved` tells whether the attempt reached storage.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub language: String,
    pub chapter_id: String,
    pub chapter_title: String,
    pub score: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub wrong_answers: i64,
    pub percentage: i64,
    pub time_spent_seconds: i64,
    pub review: Vec<QuestionReview>,
    pub saved: bool,
    pub attempt_id: Option<i64>,
    pub warning: Option<String>,
}
