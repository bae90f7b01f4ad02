#[cfg(test)]
pub mod fixtures {
    use std::sync::Arc;

    use crate::models::domain::{Question, Quiz, QuizSession};

    /// Three questions, one minute, correct answers `[1, 0, 2]`.
    pub fn three_question_quiz() -> Quiz {
        Quiz::new(
            "quiz-1",
            "Weekly Science Check",
            "Science",
            "10",
            1,
            vec![
                Question::new("Q1", &["a", "b", "c"], 1),
                Question::new("Q2", &["a", "b", "c"], 0),
                Question::new("Q3", &["a", "b", "c"], 2),
            ],
        )
    }

    /// A started session on [`three_question_quiz`] with answers `[1, 1, 2]` and `elapsed` seconds used.
    pub fn answered_session(elapsed: u32) -> QuizSession {
        let mut session = QuizSession::new(Arc::new(three_question_quiz()))
            .expect("fixture quiz should be valid");
        session.start().expect("fresh session should start");
        session.select_answer(0, 1).expect("answer in range");
        session.select_answer(1, 1).expect("answer in range");
        session.select_answer(2, 2).expect("answer in range");
        if elapsed > 0 {
            session.tick(elapsed).expect("tick while in progress");
        }
        session
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::SessionState;

    #[test]
    fn test_fixtures_three_question_quiz() {
        let quiz = three_question_quiz();
        assert_eq!(quiz.question_count(), 3);
        assert!(quiz.ensure_valid().is_ok());
    }

    #[test]
    fn test_fixtures_answered_session() {
        let session = answered_session(15);
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.answers().len(), 3);
        assert_eq!(session.remaining_seconds(), 45);
    }
}
