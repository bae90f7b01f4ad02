use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::models::domain::quiz_session::Answers;
use crate::models::domain::Quiz;

/// Outcome of grading one set of answers against a quiz.
///
/// `correct` is counted directly, never recovered from the rounded `score`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Grade {
    pub correct: u32,
    pub total: u32,
    pub score: u8,
}

impl Grade {
    pub fn incorrect(&self) -> u32 {
        self.total - self.correct
    }

    pub fn band(&self) -> PerformanceBand {
        PerformanceBand::from_score(self.score)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum PerformanceBand {
    Excellent,
    Good,
    KeepPracticing,
}

impl PerformanceBand {
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            PerformanceBand::Excellent
        } else if score >= 60 {
            PerformanceBand::Good
        } else {
            PerformanceBand::KeepPracticing
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Scorer: Send + Sync {
    fn score(&self, quiz: &Quiz, answers: &Answers) -> AppResult<Grade>;
}

/// Default scorer: one point per question whose selected option is the correct one.
#[derive(Clone, Copy, Debug, Default)]
pub struct PercentageScorer;

impl Scorer for PercentageScorer {
    fn score(&self, quiz: &Quiz, answers: &Answers) -> AppResult<Grade> {
        score_answers(quiz, answers)
    }
}

/// Grade `answers` against `quiz`. Unanswered questions count as incorrect.
pub fn score_answers(quiz: &Quiz, answers: &Answers) -> AppResult<Grade> {
    let total = quiz.questions.len();
    if total == 0 {
        return Err(AppError::InvalidQuiz(format!(
            "quiz '{}' has no questions to score",
            quiz.id
        )));
    }

    let correct = quiz
        .questions
        .iter()
        .enumerate()
        .filter(|(index, question)| {
            answers
                .get(index)
                .is_some_and(|selected| question.is_correct(*selected))
        })
        .count();

    Ok(Grade {
        correct: correct as u32,
        total: total as u32,
        score: round_percentage(correct, total),
    })
}

// Integer round-half-up of correct / total * 100.
fn round_percentage(correct: usize, total: usize) -> u8 {
    ((correct * 100 + total / 2) / total) as u8
}
