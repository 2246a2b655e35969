// src/quiz/session.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    models::{
        attempt::{NewQuizAttempt, QuestionReview, UNANSWERED},
        quiz::{PublicQuestion, QuizDefinition},
    },
    quiz::scoring::{self, Scorecard},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Quiz session not found")]
    NotFound,

    #[error("Question {index} is out of range (quiz has {count} questions)")]
    QuestionOutOfRange { index: usize, count: usize },

    #[error("Option {option} is out of range for question {index} ({count} options)")]
    OptionOutOfRange {
        index: usize,
        option: usize,
        count: usize,
    },

    #[error("Quiz has already been submitted")]
    AlreadySubmitted,

    #[error("Quiz is not being submitted")]
    NotSubmitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Answering and navigating.
    Ready,
    /// Scored, waiting on persistence. Further submits are rejected.
    Submitting,
    /// Results shown, timer frozen.
    Results,
}

/// Navigation request. `Skip` behaves exactly like `Next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "direction", content = "index", rename_all = "snake_case")]
pub enum Navigation {
    Next,
    Previous,
    Skip,
    JumpTo(usize),
}

/// One user's in-progress run through one chapter quiz.
///
/// Never persisted; dropping it is how a quiz is abandoned.
#[derive(Debug, Clone)]
pub struct QuizSession {
    user_id: i64,
    definition: Arc<QuizDefinition>,
    selected: Vec<Option<usize>>,
    current: usize,
    phase: SessionPhase,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    last_activity: DateTime<Utc>,
}

impl QuizSession {
    pub fn start(definition: Arc<QuizDefinition>, user_id: i64, now: DateTime<Utc>) -> Self {
        let selected = vec![None; definition.question_count()];
        Self {
            user_id,
            definition,
            selected,
            current: 0,
            phase: SessionPhase::Ready,
            started_at: now,
            finished_at: None,
            last_activity: now,
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn definition(&self) -> &Arc<QuizDefinition> {
        &self.definition
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn selected_answers(&self) -> &[Option<usize>] {
        &self.selected
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Whole seconds since start; frozen once results are reached.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        let end = self.finished_at.unwrap_or(now);
        (end - self.started_at).num_seconds().max(0)
    }

    /// Records or overwrites the choice for a question.
    pub fn select_answer(
        &mut self,
        question_index: usize,
        option_index: usize,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        self.ensure_ready()?;
        let count = self.selected.len();
        let question = self
            .definition
            .questions
            .get(question_index)
            .ok_or(SessionError::QuestionOutOfRange {
                index: question_index,
                count,
            })?;
        if option_index >= question.options.len() {
            return Err(SessionError::OptionOutOfRange {
                index: question_index,
                option: option_index,
                count: question.options.len(),
            });
        }

        self.selected[question_index] = Some(option_index);
        self.last_activity = now;
        Ok(())
    }

    /// Moves the cursor, clamping at both ends. Returns the new index.
    pub fn navigate(&mut self, nav: Navigation, now: DateTime<Utc>) -> Result<usize, SessionError> {
        self.ensure_ready()?;
        let count = self.selected.len();
        self.current = match nav {
            Navigation::Next | Navigation::Skip => {
                if self.current + 1 < count {
                    self.current + 1
                } else {
                    self.current
                }
            }
            Navigation::Previous => self.current.saturating_sub(1),
            Navigation::JumpTo(index) if index < count => index,
            Navigation::JumpTo(index) => {
                return Err(SessionError::QuestionOutOfRange { index, count });
            }
        };
        self.last_activity = now;
        Ok(self.current)
    }

    /// Scores the current selections and enters `Submitting`.
    ///
    /// Scoring depends only on local state, so the returned attempt is the
    /// result the user sees whether or not it is later saved.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<NewQuizAttempt, SessionError> {
        self.ensure_ready()?;
        self.phase = SessionPhase::Submitting;
        self.last_activity = now;

        let card = self.scorecard();
        Ok(NewQuizAttempt {
            user_id: self.user_id,
            language: self.definition.language.clone(),
            chapter_id: self.definition.chapter_id.clone(),
            chapter_title: self.definition.title.clone(),
            score: card.correct_answers,
            total_questions: card.total_questions,
            correct_answers: card.correct_answers,
            wrong_answers: card.wrong_answers,
            percentage: card.percentage,
            answers: card.answers,
            attempted_at: now,
            time_spent_seconds: self.elapsed_seconds(now),
        })
    }

    /// `Submitting -> Results`. Freezes the timer.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Submitting {
            return Err(SessionError::NotSubmitting);
        }
        self.phase = SessionPhase::Results;
        self.finished_at = Some(now);
        self.last_activity = now;
        Ok(())
    }

    pub fn scorecard(&self) -> Scorecard {
        scoring::score(&self.definition.questions, &self.selected)
    }

    /// Results screen rows, answers and explanations revealed.
    pub fn review(&self) -> Vec<QuestionReview> {
        let card = self.scorecard();
        self.definition
            .questions
            .iter()
            .zip(card.answers)
            .map(|(q, detail)| QuestionReview {
                question_id: q.id,
                prompt: q.prompt.clone(),
                options: q.options.clone(),
                selected_answer: detail.selected_answer,
                correct_answer: detail.correct_answer,
                is_correct: detail.is_correct,
                explanation: q.explanation.clone(),
            })
            .collect()
    }

    fn ensure_ready(&self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Ready => Ok(()),
            SessionPhase::Submitting | SessionPhase::Results => Err(SessionError::AlreadySubmitted),
        }
    }
}

/// Snapshot of a session as returned to the client.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: uuid::Uuid,
    pub phase: SessionPhase,
    pub language: String,
    pub chapter_id: String,
    pub question_count: usize,
    pub current_question_index: usize,
    pub current_question: Option<PublicQuestion>,
    /// One slot per question, `-1` when unanswered.
    pub selected_answers: Vec<i64>,
    pub elapsed_seconds: i64,
}

impl SessionView {
    pub fn new(session_id: uuid::Uuid, session: &QuizSession, now: DateTime<Utc>) -> Self {
        let def = session.definition();
        Self {
            session_id,
            phase: session.phase(),
            language: def.language.clone(),
            chapter_id: def.chapter_id.clone(),
            question_count: def.question_count(),
            current_question_index: session.current_index(),
            current_question: def
                .questions
                .get(session.current_index())
                .map(PublicQuestion::from),
            selected_answers: session
                .selected_answers()
                .iter()
                .map(|slot| slot.map_or(UNANSWERED, |c| c as i64))
                .collect(),
            elapsed_seconds: session.elapsed_seconds(now),
        }
    }
}
