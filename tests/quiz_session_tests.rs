mod common;

use std::sync::Arc;

use quiz_session_server::{
    errors::AppError,
    models::domain::{
        quiz_session::{Answers, CompletionTrigger, SubmitOutcome, TickOutcome},
        QuizSession, SessionState,
    },
    services::{
        quiz_result_service::QuizResultService,
        scoring_service::{score_answers, PercentageScorer, Scorer},
    },
};

use common::science_quiz;

#[test]
fn submitted_attempt_scores_two_of_three() {
    let mut session = QuizSession::new(Arc::new(science_quiz())).unwrap();

    session.start().unwrap();
    session.select_answer(0, 1).unwrap();
    session.select_answer(1, 1).unwrap();
    session.select_answer(2, 2).unwrap();
    session.tick(17).unwrap();

    let outcome = session.submit().unwrap();
    assert!(matches!(outcome, SubmitOutcome::Completed(grade) if grade.score == 67));

    let result = QuizResultService::build_result("attempt-1", "student-1", &session).unwrap();
    assert_eq!(result.score, 67);
    assert_eq!(result.correct_answers, 2);
    assert_eq!(result.total_questions, 3);
    assert_eq!(result.time_taken_seconds, 60 - session.remaining_seconds());
    assert_eq!(result.time_taken_seconds, 17);
}

#[test]
fn unanswered_attempt_times_out_with_zero() {
    let mut session = QuizSession::new(Arc::new(science_quiz())).unwrap();

    session.start().unwrap();
    let outcome = session.tick(60).unwrap();

    assert!(matches!(outcome, TickOutcome::Expired(grade) if grade.score == 0));
    assert_eq!(session.state(), SessionState::Completed);
    assert_eq!(session.remaining_seconds(), 0);
    assert_eq!(session.score(), Some(0));
    assert_eq!(session.completion_trigger(), Some(CompletionTrigger::TimedOut));
}

#[test]
fn full_marks_and_empty_answers() {
    let quiz = science_quiz();
    let all_correct: Answers = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| (i, q.correct_answer))
        .collect();

    assert_eq!(score_answers(&quiz, &all_correct).unwrap().score, 100);
    assert_eq!(score_answers(&quiz, &Answers::new()).unwrap().score, 0);
}

#[test]
fn scoring_same_inputs_twice_is_identical() {
    let quiz = science_quiz();
    let answers: Answers = [(0, 1), (2, 0)].into_iter().collect();

    assert_eq!(
        PercentageScorer.score(&quiz, &answers).unwrap(),
        PercentageScorer.score(&quiz, &answers).unwrap()
    );
}

#[test]
fn last_second_tick_and_submit_complete_once() {
    let mut session = QuizSession::new(Arc::new(science_quiz())).unwrap();
    session.start().unwrap();
    session.tick(59).unwrap();
    assert_eq!(session.remaining_seconds(), 1);

    assert!(matches!(session.tick(1).unwrap(), TickOutcome::Expired(_)));
    let stamped = session.completed_at();

    assert_eq!(session.submit().unwrap(), SubmitOutcome::AlreadyCompleted);
    assert_eq!(session.tick(1).unwrap(), TickOutcome::AlreadyCompleted);
    assert_eq!(session.completed_at(), stamped);
}

#[test]
fn answers_are_guarded_outside_progress() {
    let mut session = QuizSession::new(Arc::new(science_quiz())).unwrap();
    assert!(matches!(
        session.select_answer(0, 0),
        Err(AppError::InvalidTransition(_))
    ));

    session.start().unwrap();
    session.select_answer(0, 0).unwrap();
    session.submit().unwrap();

    assert!(matches!(
        session.select_answer(1, 0),
        Err(AppError::InvalidTransition(_))
    ));
    assert_eq!(session.answers().len(), 1);
}

#[test]
fn navigation_is_clamped() {
    let mut session = QuizSession::new(Arc::new(science_quiz())).unwrap();
    session.start().unwrap();

    assert_eq!(session.go_to_previous().unwrap(), 0);
    session.go_to_next().unwrap();
    session.go_to_next().unwrap();
    assert_eq!(session.go_to_next().unwrap(), 2);
}

#[test]
fn record_is_a_snapshot() {
    let mut session = QuizSession::new(Arc::new(science_quiz())).unwrap();
    session.start().unwrap();
    session.select_answer(1, 0).unwrap();
    session.submit().unwrap();

    let result = QuizResultService::build_result("attempt-2", "student-2", &session).unwrap();
    drop(session);

    assert_eq!(result.answers.len(), 1);
    assert_eq!(result.answers[0].question_index, 1);
    assert_eq!(result.answers[0].option_index, 0);
}
