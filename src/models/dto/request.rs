use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, max = 128))]
    pub student_id: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SelectAnswerRequest {
    pub question_index: usize,
    pub option_index: usize,
}

#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct TickRequest {
    #[validate(range(max = 3600))]
    pub elapsed_seconds: u32,
}
