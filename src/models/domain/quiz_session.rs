use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::models::domain::{Question, Quiz};
use crate::services::scoring_service::{Grade, PercentageScorer, Scorer};

/// Question index -> selected option index.
pub type Answers = BTreeMap<usize, usize>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::NotStarted => "not started",
            SessionState::InProgress => "in progress",
            SessionState::Completed => "completed",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum CompletionTrigger {
    Submitted,
    TimedOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// This call performed the completion.
    Completed(Grade),
    /// The session had already completed; nothing changed.
    AlreadyCompleted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running(u32),
    /// The clock ran out during this tick and the session completed.
    Expired(Grade),
    AlreadyCompleted,
}

/// One student's attempt at a quiz.
///
/// State only moves forward: `NotStarted -> InProgress -> Completed`. Every
/// method either succeeds or returns an error with the session untouched.
/// Completion happens exactly once, through whichever of [`QuizSession::submit`]
/// or an expiring [`QuizSession::tick`] gets there first; the grade is cached
/// and later calls to either are no-ops.
pub struct QuizSession {
    quiz: Arc<Quiz>,
    scorer: Arc<dyn Scorer>,
    state: SessionState,
    current_question_index: usize,
    answers: Answers,
    remaining_seconds: u32,
    grade: Option<Grade>,
    completed_at: Option<DateTime<Utc>>,
    completion_trigger: Option<CompletionTrigger>,
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz.id)
            .field("state", &self.state)
            .field("current_question_index", &self.current_question_index)
            .field("answers", &self.answers)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("grade", &self.grade)
            .field("completed_at", &self.completed_at)
            .finish()
    }
}

impl QuizSession {
    pub fn new(quiz: Arc<Quiz>) -> AppResult<Self> {
        Self::with_scorer(quiz, Arc::new(PercentageScorer))
    }

    pub fn with_scorer(quiz: Arc<Quiz>, scorer: Arc<dyn Scorer>) -> AppResult<Self> {
        quiz.ensure_valid()?;
        let remaining_seconds = quiz.duration_seconds();

        Ok(QuizSession {
            quiz,
            scorer,
            state: SessionState::NotStarted,
            current_question_index: 0,
            answers: Answers::new(),
            remaining_seconds,
            grade: None,
            completed_at: None,
            completion_trigger: None,
        })
    }

    pub fn start(&mut self) -> AppResult<()> {
        if self.state != SessionState::NotStarted {
            return Err(self.invalid_transition("start"));
        }

        self.remaining_seconds = self.quiz.duration_seconds();
        self.current_question_index = 0;
        self.answers.clear();
        self.state = SessionState::InProgress;
        Ok(())
    }

    /// Record (or overwrite) the option chosen for a question. Does not move the pointer.
    pub fn select_answer(&mut self, question_index: usize, option_index: usize) -> AppResult<()> {
        self.require_in_progress("select an answer")?;

        let question = self.quiz.questions.get(question_index).ok_or_else(|| {
            AppError::OutOfRange(format!(
                "question index {} (quiz has {} questions)",
                question_index,
                self.quiz.question_count()
            ))
        })?;

        if option_index >= question.option_count() {
            return Err(AppError::OutOfRange(format!(
                "option index {} for question {} (question has {} options)",
                option_index,
                question_index,
                question.option_count()
            )));
        }

        self.answers.insert(question_index, option_index);
        Ok(())
    }

    /// Move to the next question; a no-op on the last one.
    pub fn go_to_next(&mut self) -> AppResult<usize> {
        self.require_in_progress("navigate")?;

        if self.current_question_index + 1 < self.quiz.question_count() {
            self.current_question_index += 1;
        }
        Ok(self.current_question_index)
    }

    /// Move to the previous question; a no-op on the first one.
    pub fn go_to_previous(&mut self) -> AppResult<usize> {
        self.require_in_progress("navigate")?;

        self.current_question_index = self.current_question_index.saturating_sub(1);
        Ok(self.current_question_index)
    }

    /// Advance the clock by `elapsed_seconds`, completing the session if it hits zero.
    pub fn tick(&mut self, elapsed_seconds: u32) -> AppResult<TickOutcome> {
        match self.state {
            SessionState::NotStarted => return Err(self.invalid_transition("tick")),
            SessionState::Completed => return Ok(TickOutcome::AlreadyCompleted),
            SessionState::InProgress => {}
        }

        let remaining = self.remaining_seconds.saturating_sub(elapsed_seconds);
        if remaining > 0 {
            self.remaining_seconds = remaining;
            return Ok(TickOutcome::Running(remaining));
        }

        let grade = self.scorer.score(&self.quiz, &self.answers)?;
        self.remaining_seconds = 0;
        self.complete(grade, CompletionTrigger::TimedOut);
        Ok(TickOutcome::Expired(grade))
    }

    pub fn submit(&mut self) -> AppResult<SubmitOutcome> {
        match self.state {
            SessionState::NotStarted => return Err(self.invalid_transition("submit")),
            SessionState::Completed => return Ok(SubmitOutcome::AlreadyCompleted),
            SessionState::InProgress => {}
        }

        let grade = self.scorer.score(&self.quiz, &self.answers)?;
        self.complete(grade, CompletionTrigger::Submitted);
        Ok(SubmitOutcome::Completed(grade))
    }

    fn complete(&mut self, grade: Grade, trigger: CompletionTrigger) {
        self.grade = Some(grade);
        self.completed_at = Some(Utc::now());
        self.completion_trigger = Some(trigger);
        self.state = SessionState::Completed;
    }

    fn require_in_progress(&self, action: &str) -> AppResult<()> {
        if self.state != SessionState::InProgress {
            return Err(self.invalid_transition(action));
        }
        Ok(())
    }

    fn invalid_transition(&self, action: &str) -> AppError {
        AppError::InvalidTransition(format!(
            "cannot {}: session is {}",
            action, self.state
        ))
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn current_question(&self) -> AppResult<&Question> {
        self.require_in_progress("read the current question")?;
        self.quiz
            .questions
            .get(self.current_question_index)
            .ok_or_else(|| AppError::InternalError("question pointer out of bounds".to_string()))
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.quiz
            .duration_seconds()
            .saturating_sub(self.remaining_seconds)
    }

    pub fn grade(&self) -> Option<Grade> {
        self.grade
    }

    pub fn score(&self) -> Option<u8> {
        self.grade.map(|g| g.score)
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn completion_trigger(&self) -> Option<CompletionTrigger> {
        self.completion_trigger
    }
}
