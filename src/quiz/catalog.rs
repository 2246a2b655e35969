// src/quiz/catalog.rs

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::models::quiz::{ChapterSummary, QuizDefinition};

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("Quiz not found: {language}/{chapter_id}")]
    NotFound {
        language: String,
        chapter_id: String,
    },

    #[error("Quiz {path} is malformed: {reason}")]
    Invalid { path: String, reason: String },

    #[error("Failed to read quiz data: {0}")]
    Io(#[from] io::Error),
}

/// Static quiz definitions laid out as `<root>/<language>/<chapter_id>.json`.
#[derive(Debug, Clone)]
pub struct QuizCatalog {
    root: PathBuf,
}

impl QuizCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loads and checks one chapter quiz.
    ///
    /// A missing file, or a key that cannot name a file inside the catalog,
    /// is `QuizError::NotFound`.
    pub async fn load(&self, language: &str, chapter_id: &str) -> Result<QuizDefinition, QuizError> {
        let not_found = || QuizError::NotFound {
            language: language.to_string(),
            chapter_id: chapter_id.to_string(),
        };

        if !is_safe_segment(language) || !is_safe_segment(chapter_id) {
            return Err(not_found());
        }

        let path = self
            .root
            .join(language)
            .join(format!("{}.json", chapter_id));

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(QuizError::Io(e)),
        };

        let mut definition: QuizDefinition =
            serde_json::from_slice(&raw).map_err(|e| QuizError::Invalid {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        // Attempts are filed under the key the quiz was opened with, whatever
        // the file itself claims.
        definition.chapter_id = chapter_id.to_string();

        check_definition(&definition).map_err(|reason| QuizError::Invalid {
            path: path.display().to_string(),
            reason,
        })?;

        Ok(definition)
    }

    /// Lists the chapters of a language, ordered by chapter id.
    ///
    /// Unknown languages yield an empty list. Broken files are logged and skipped.
    pub async fn list_chapters(&self, language: &str) -> Result<Vec<ChapterSummary>, QuizError> {
        if !is_safe_segment(language) {
            return Ok(Vec::new());
        }

        let mut dir = match tokio::fs::read_dir(self.root.join(language)).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(QuizError::Io(e)),
        };

        let mut chapter_ids = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                chapter_ids.push(stem.to_string());
            }
        }
        chapter_ids.sort();

        let mut chapters = Vec::with_capacity(chapter_ids.len());
        for chapter_id in chapter_ids {
            match self.load(language, &chapter_id).await {
                Ok(def) => chapters.push(ChapterSummary::from(&def)),
                Err(e) => tracing::warn!("Skipping chapter {}/{}: {}", language, chapter_id, e),
            }
        }

        Ok(chapters)
    }
}

/// Restricts lookup keys to a single plain path component (`c++`, `basics-1`).
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() <= 64
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+'))
}

fn check_definition(def: &QuizDefinition) -> Result<(), String> {
    for q in &def.questions {
        if q.options.len() < 2 {
            return Err(format!("question {} has fewer than two options", q.id));
        }
        if q.correct_option_index >= q.options.len() {
            return Err(format!(
                "question {} has correct answer {} but only {} options",
                q.id,
                q.correct_option_index,
                q.options.len()
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn temp_catalog() -> (QuizCatalog, PathBuf) {
        let root = std::env::temp_dir().join(format!("quiz-catalog-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(root.join("python")).unwrap();
        (QuizCatalog::new(&root), root)
    }

    fn write(root: &Path, rel: &str, body: &str) {
        std::fs::write(root.join(rel), body).unwrap();
    }

    const BASICS: &str = r#"{
        "id": "basics", "language": "python", "title": "Basics", "description": "d",
        "questions": [{"id": 1, "question": "Q", "options": ["a", "b"], "correctAnswer": 0}]
    }"#;

    #[tokio::test]
    async fn loads_existing_chapter_and_fills_chapter_id() {
        let (catalog, root) = temp_catalog();
        write(&root, "python/basics.json", BASICS);

        let def = catalog.load("python", "basics").await.unwrap();
        assert_eq!(def.chapter_id, "basics");
        assert_eq!(def.question_count(), 1);

        std::fs::remove_dir_all(root).ok();
    }

    #[tokio::test]
    async fn lookup_key_wins_over_file_chapter_and_id() {
        let (catalog, root) = temp_catalog();
        write(
            &root,
            "python/loops.json",
            r#"{"id": "loops-v2", "chapter": "iteration", "language": "python", "title": "Loops",
                "questions": [{"id": 1, "question": "Q", "options": ["a", "b"], "correctAnswer": 1}]}"#,
        );

        let def = catalog.load("python", "loops").await.unwrap();
        assert_eq!(def.chapter_id, "loops");

        let chapters = catalog.list_chapters("python").await.unwrap();
        assert_eq!(chapters[0].chapter_id, "loops");

        std::fs::remove_dir_all(root).ok();
    }

    #[tokio::test]
    async fn missing_chapter_is_not_found() {
        let (catalog, root) = temp_catalog();

        let err = catalog.load("rust", "basics").await.unwrap_err();
        assert!(matches!(err, QuizError::NotFound { .. }));

        std::fs::remove_dir_all(root).ok();
    }

    #[tokio::test]
    async fn path_traversal_is_not_found() {
        let (catalog, root) = temp_catalog();

        let err = catalog.load("..", "secrets").await.unwrap_err();
        assert!(matches!(err, QuizError::NotFound { .. }));
        let err = catalog.load("python", "../python/basics").await.unwrap_err();
        assert!(matches!(err, QuizError::NotFound { .. }));

        std::fs::remove_dir_all(root).ok();
    }

    #[tokio::test]
    async fn correct_index_out_of_range_is_invalid() {
        let (catalog, root) = temp_catalog();
        write(
            &root,
            "python/broken.json",
            r#"{"id": "broken", "language": "python", "title": "B",
                "questions": [{"id": 1, "question": "Q", "options": ["a", "b"], "correctAnswer": 5}]}"#,
        );

        let err = catalog.load("python", "broken").await.unwrap_err();
        assert!(matches!(err, QuizError::Invalid { .. }));

        std::fs::remove_dir_all(root).ok();
    }

    #[tokio::test]
    async fn lists_chapters_sorted_and_skips_broken_files() {
        let (catalog, root) = temp_catalog();
        write(&root, "python/basics.json", BASICS);
        write(
            &root,
            "python/advanced.json",
            r#"{"id": "advanced", "language": "python", "title": "Advanced", "questions": []}"#,
        );
        write(&root, "python/zzz.json", "{ not json");
        write(&root, "python/notes.txt", "ignored");

        let chapters = catalog.list_chapters("python").await.unwrap();
        let ids: Vec<_> = chapters.iter().map(|c| c.chapter_id.as_str()).collect();
        assert_eq!(ids, ["advanced", "basics"]);
        assert_eq!(chapters[1].question_count, 1);

        assert!(catalog.list_chapters("cobol").await.unwrap().is_empty());

        std::fs::remove_dir_all(root).ok();
    }
}
