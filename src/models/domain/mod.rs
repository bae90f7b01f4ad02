pub mod quiz;
pub mod quiz_question;
pub mod quiz_result;
pub mod quiz_session;
pub use quiz::Quiz;
pub use quiz_question::Question;
pub use quiz_result::QuizResult;
pub use quiz_session::{QuizSession, SessionState};
