use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A single multiple-choice question. `correct_answer` is a 0-based index into `options`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_correct_answer"))]
pub struct Question {
    #[validate(length(min = 1))]
    pub question: String,
    #[validate(length(min = 2))]
    pub options: Vec<String>,
    pub correct_answer: usize,
}

impl Question {
    pub fn new(question: &str, options: &[&str], correct_answer: usize) -> Self {
        Question {
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer,
        }
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_answer
    }
}

fn validate_correct_answer(question: &Question) -> Result<(), ValidationError> {
    if question.correct_answer >= question.options.len() {
        return Err(ValidationError::new("correct_answer_out_of_range"));
    }
    Ok(())
}
