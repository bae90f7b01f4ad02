use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::quiz_session::CompletionTrigger;
use crate::models::domain::{Question, Quiz, QuizResult, QuizSession, SessionState};
use crate::services::scoring_service::PerformanceBand;

/// A question as shown to the student, without its answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub question: String,
    pub options: Vec<String>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        QuestionView {
            question: question.question.clone(),
            options: question.options.clone(),
        }
    }
}

/// What a student sees before starting a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizOverview {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub class_label: String,
    pub question_count: usize,
    pub duration_minutes: u32,
}

impl From<&Quiz> for QuizOverview {
    fn from(quiz: &Quiz) -> Self {
        QuizOverview {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            subject: quiz.subject.clone(),
            class_label: quiz.class_label.clone(),
            question_count: quiz.question_count(),
            duration_minutes: quiz.duration_minutes,
        }
    }
}

/// Read-only snapshot of a session, published after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub quiz_id: String,
    pub quiz_title: String,
    pub subject: String,
    pub class_label: String,
    pub state: SessionState,
    pub current_question_index: usize,
    pub question_number: usize,
    pub total_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<usize>,
    pub answered_count: usize,
    pub remaining_seconds: u32,
    pub clock: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_band: Option<PerformanceBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_trigger: Option<CompletionTrigger>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionView {
    pub fn from_session(session_id: &str, session: &QuizSession) -> Self {
        let quiz = session.quiz();
        let index = session.current_question_index();
        let grade = session.grade();

        SessionView {
            session_id: session_id.to_string(),
            quiz_id: quiz.id.clone(),
            quiz_title: quiz.title.clone(),
            subject: quiz.subject.clone(),
            class_label: quiz.class_label.clone(),
            state: session.state(),
            current_question_index: index,
            question_number: index + 1,
            total_questions: quiz.question_count(),
            current_question: session.current_question().ok().map(QuestionView::from),
            selected_option: session.answers().get(&index).copied(),
            answered_count: session.answers().len(),
            remaining_seconds: session.remaining_seconds(),
            clock: format_clock(session.remaining_seconds()),
            score: grade.map(|g| g.score),
            correct_answers: grade.map(|g| g.correct),
            performance_band: grade.map(|g| g.band()),
            completion_trigger: session.completion_trigger(),
            completed_at: session.completed_at(),
        }
    }

    /// Final view of a session that has already left the live registry.
    ///
    /// The navigation position is not part of the record, so the view points at the first question.
    pub fn from_result(result: &QuizResult) -> Self {
        let answers = result.answer_map();
        let remaining = result
            .time_allowed_seconds
            .saturating_sub(result.time_taken_seconds);

        SessionView {
            session_id: result.id.clone(),
            quiz_id: result.quiz_id.clone(),
            quiz_title: result.quiz_title.clone(),
            subject: result.subject.clone(),
            class_label: result.class_label.clone(),
            state: SessionState::Completed,
            current_question_index: 0,
            question_number: 1,
            total_questions: result.total_questions as usize,
            current_question: None,
            selected_option: answers.get(&0).copied(),
            answered_count: answers.len(),
            remaining_seconds: remaining,
            clock: format_clock(remaining),
            score: Some(result.score),
            correct_answers: Some(result.correct_answers),
            performance_band: Some(result.performance_band),
            completion_trigger: Some(result.completion_trigger),
            completed_at: Some(result.completed_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteSessionResponse {
    pub message: String,
}

/// `m:ss` countdown display.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
