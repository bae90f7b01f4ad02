use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::domain::quiz_question::Question;

/// A quiz as supplied by the content store. Sessions only ever read it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub title: String,
    pub subject: String,
    #[serde(rename = "class")]
    pub class_label: String,
    #[serde(rename = "duration")]
    #[validate(range(min = 1))]
    pub duration_minutes: u32, // whole minutes
    #[validate(length(min = 1))]
    #[validate(nested)]
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Quiz {
    pub fn new(
        id: &str,
        title: &str,
        subject: &str,
        class_label: &str,
        duration_minutes: u32,
        questions: Vec<Question>,
    ) -> Self {
        Quiz {
            id: id.to_string(),
            title: title.to_string(),
            subject: subject.to_string(),
            class_label: class_label.to_string(),
            duration_minutes,
            questions,
            created_at: Some(Utc::now()),
        }
    }

    /// Structural check performed before a session may be built from this quiz.
    pub fn ensure_valid(&self) -> AppResult<()> {
        self.validate()
            .map_err(|e| AppError::InvalidQuiz(format!("quiz '{}': {}", self.id, e)))
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_minutes.saturating_mul(60)
    }
}
