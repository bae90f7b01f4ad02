use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::quiz_session::{Answers, CompletionTrigger};
use crate::services::scoring_service::PerformanceBand;

/// The immutable outcome of one completed attempt, as stored by the results collection.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizResult {
    pub id: String,
    pub student_id: String,
    pub quiz_id: String,
    pub quiz_title: String,
    pub subject: String,
    pub class_label: String,
    pub score: u8,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub answers: Vec<RecordedAnswer>,
    pub completed_at: DateTime<Utc>,
    pub time_taken_seconds: u32,
    pub time_allowed_seconds: u32,
    pub completion_trigger: CompletionTrigger,
    pub performance_band: PerformanceBand,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecordedAnswer {
    pub question_index: u32,
    pub option_index: u32,
}

impl QuizResult {
    pub fn incorrect_answers(&self) -> u32 {
        self.total_questions - self.correct_answers
    }

    /// Rebuild the answer mapping from the stored snapshot.
    pub fn answer_map(&self) -> Answers {
        self.answers
            .iter()
            .map(|a| (a.question_index as usize, a.option_index as usize))
            .collect()
    }
}
