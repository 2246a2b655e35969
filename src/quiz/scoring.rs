// src/quiz/scoring.rs

use crate::models::{
    attempt::{AnswerDetail, UNANSWERED},
    quiz::Question,
};

/// `round(correct / total * 100)` with halves rounded up, 0 for an empty quiz.
///
/// Integer arithmetic keeps 2/3 at exactly 67 and 1/8 at 13.
pub fn percentage(correct: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (200 * correct + total) / (2 * total)
}

/// Outcome of scoring one set of selections against a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scorecard {
    pub answers: Vec<AnswerDetail>,
    pub total_questions: i64,
    pub answered: i64,
    pub correct_answers: i64,
    /// Answered but wrong. Skipped questions are not counted here.
    pub wrong_answers: i64,
    pub percentage: i64,
}

/// Scores `selected` (one slot per question) against `questions`.
///
/// Missing trailing slots count as unanswered.
pub fn score(questions: &[Question], selected: &[Option<usize>]) -> Scorecard {
    let answers: Vec<AnswerDetail> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let choice = selected.get(i).copied().flatten();
            AnswerDetail {
                question_id: q.id,
                selected_answer: choice.map_or(UNANSWERED, |c| c as i64),
                correct_answer: q.correct_option_index as i64,
                is_correct: choice == Some(q.correct_option_index),
            }
        })
        .collect();

    let total_questions = answers.len() as i64;
    let answered = answers
        .iter()
        .filter(|a| a.selected_answer != UNANSWERED)
        .count() as i64;
    let correct_answers = answers.iter().filter(|a| a.is_correct).count() as i64;

    Scorecard {
        answers,
        total_questions,
        answered,
        correct_answers,
        wrong_answers: answered - correct_answers,
        percentage: percentage(correct_answers, total_questions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(correct: &[usize]) -> Vec<Question> {
        correct
            .iter()
            .enumerate()
            .map(|(i, &c)| Question {
                id: i as i64 + 1,
                prompt: format!("Q{}", i + 1),
                options: vec!["a".into(), "b".into(), "c".into()],
                correct_option_index: c,
                explanation: String::new(),
            })
            .collect()
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(3, 3), 100);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn skipped_question_is_not_wrong_but_lowers_percentage() {
        let card = score(&questions(&[1, 0, 2]), &[Some(1), Some(0), None]);

        assert_eq!(card.correct_answers, 2);
        assert_eq!(card.wrong_answers, 0);
        assert_eq!(card.percentage, 67);
        assert_eq!(card.answers[2].selected_answer, UNANSWERED);
        assert!(!card.answers[2].is_correct);
    }

    #[test]
    fn nothing_answered_scores_zero() {
        let card = score(&questions(&[0, 1]), &[None, None]);

        assert_eq!(card.correct_answers, 0);
        assert_eq!(card.wrong_answers, 0);
        assert_eq!(card.percentage, 0);
        assert_eq!(card.answers.len(), 2);
    }

    #[test]
    fn wrong_plus_correct_never_exceeds_total() {
        let qs = questions(&[0, 1, 2, 0]);
        let selections = [
            vec![Some(0), Some(1), Some(2), Some(0)],
            vec![Some(1), Some(2), Some(0), Some(1)],
            vec![Some(0), None, Some(0), None],
            vec![None, None, None, None],
        ];
        for selected in &selections {
            let card = score(&qs, selected);
            assert_eq!(card.wrong_answers, card.answered - card.correct_answers);
            assert!(card.wrong_answers + card.correct_answers <= card.total_questions);
            assert_eq!(
                card.percentage,
                percentage(card.correct_answers, card.total_questions)
            );
        }
    }

    #[test]
    fn empty_quiz_is_legal() {
        let card = score(&[], &[]);
        assert_eq!(card.total_questions, 0);
        assert_eq!(card.percentage, 0);
    }
}
