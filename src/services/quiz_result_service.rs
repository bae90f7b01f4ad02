use crate::errors::{AppError, AppResult};
use crate::models::domain::quiz_result::{QuizResult, RecordedAnswer};
use crate::models::domain::QuizSession;

pub struct QuizResultService;

impl QuizResultService {
    /// Build the result record for a completed session.
    ///
    /// The answers are copied out of the session, so the record never shares
    /// state with it. `result_id` is normally the session id.
    pub fn build_result(
        result_id: &str,
        student_id: &str,
        session: &QuizSession,
    ) -> AppResult<QuizResult> {
        let (grade, completed_at, trigger) = match (
            session.grade(),
            session.completed_at(),
            session.completion_trigger(),
        ) {
            (Some(grade), Some(completed_at), Some(trigger)) if session.is_completed() => {
                (grade, completed_at, trigger)
            }
            _ => {
                return Err(AppError::InvalidState(format!(
                    "result requested for a session that is {}",
                    session.state()
                )))
            }
        };

        let quiz = session.quiz();
        let answers = session
            .answers()
            .iter()
            .map(|(&question_index, &option_index)| RecordedAnswer {
                question_index: question_index as u32,
                option_index: option_index as u32,
            })
            .collect();

        Ok(QuizResult {
            id: result_id.to_string(),
            student_id: student_id.to_string(),
            quiz_id: quiz.id.clone(),
            quiz_title: quiz.title.clone(),
            subject: quiz.subject.clone(),
            class_label: quiz.class_label.clone(),
            score: grade.score,
            correct_answers: grade.correct,
            total_questions: quiz.question_count() as u32,
            answers,
            completed_at,
            time_taken_seconds: session.elapsed_seconds(),
            time_allowed_seconds: quiz.duration_seconds(),
            completion_trigger: trigger,
            performance_band: grade.band(),
        })
    }
}
