// src/models/quiz.rs

use serde::{Deserialize, Serialize};

/// A single multiple-choice question as stored in the quiz JSON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    #[serde(rename = "question", alias = "prompt")]
    pub prompt: String,

    /// At least two entries.
    pub options: Vec<String>,

    /// Index into `options`.
    #[serde(rename = "correctAnswer", alias = "correctOptionIndex")]
    pub correct_option_index: usize,

    #[serde(default)]
    pub explanation: String,
}

/// A chapter quiz, read-only once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDefinition {
    pub id: String,
    pub language: String,

    /// Filled from the lookup key when the file omits it.
    #[serde(rename = "chapter", alias = "chapterId", default)]
    pub chapter_id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub questions: Vec<Question>,
}

impl QuizDefinition {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

/// DTO for sending a question to the client (excludes answer and explanation).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub prompt: String,
    pub options: Vec<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            prompt: q.prompt.clone(),
            options: q.options.clone(),
        }
    }
}

/// DTO for a quiz as shown before submission.
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuiz {
    pub id: String,
    pub language: String,
    pub chapter_id: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<PublicQuestion>,
}

impl From<&QuizDefinition> for PublicQuiz {
    fn from(def: &QuizDefinition) -> Self {
        Self {
            id: def.id.clone(),
            language: def.language.clone(),
            chapter_id: def.chapter_id.clone(),
            title: def.title.clone(),
            description: def.description.clone(),
            questions: def.questions.iter().map(PublicQuestion::from).collect(),
        }
    }
}

/// Entry of a language's chapter list.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterSummary {
    pub chapter_id: String,
    pub title: String,
    pub description: String,
    pub question_count: usize,
}

impl From<&QuizDefinition> for ChapterSummary {
    fn from(def: &QuizDefinition) -> Self {
        Self {
            chapter_id: def.chapter_id.clone(),
            title: def.title.clone(),
            description: def.description.clone(),
            question_count: def.question_count(),
        }
    }
}
