#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use quiz_session_server::{
    errors::{AppError, AppResult},
    models::domain::{quiz_session::Answers, Question, Quiz, QuizResult},
    repositories::{QuizRepository, QuizResultRepository},
    services::{
        quiz_service::QuizService,
        quiz_session_service::QuizSessionService,
        scoring_service::{score_answers, Grade, PercentageScorer, Scorer},
    },
};

pub struct InMemoryQuizRepository {
    quizzes: Arc<RwLock<HashMap<String, Quiz>>>,
}

impl InMemoryQuizRepository {
    pub fn with_quizzes(quizzes: Vec<Quiz>) -> Self {
        Self {
            quizzes: Arc::new(RwLock::new(
                quizzes.into_iter().map(|q| (q.id.clone(), q)).collect(),
            )),
        }
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes.get(id).cloned())
    }
}

pub struct InMemoryQuizResultRepository {
    results: Arc<RwLock<HashMap<String, QuizResult>>>,
}

impl InMemoryQuizResultRepository {
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.results.read().await.len()
    }
}

#[async_trait]
impl QuizResultRepository for InMemoryQuizResultRepository {
    async fn create(&self, result: QuizResult) -> AppResult<QuizResult> {
        let mut results = self.results.write().await;
        if results.contains_key(&result.id) {
            return Err(AppError::DatabaseError(format!(
                "Result with id '{}' already exists",
                result.id
            )));
        }
        results.insert(result.id.clone(), result.clone());
        Ok(result)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizResult>> {
        let results = self.results.read().await;
        Ok(results.get(id).cloned())
    }

    async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<QuizResult>> {
        let results = self.results.read().await;
        let mut items: Vec<_> = results
            .values()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(items)
    }
}

/// Three questions, one minute, correct answers `[1, 0, 2]`.
pub fn science_quiz() -> Quiz {
    Quiz::new(
        "quiz-science",
        "Weekly Science Check",
        "Science",
        "10",
        1,
        vec![
            Question::new("Boiling point of water at sea level?", &["90C", "100C", "110C"], 1),
            Question::new("Chemical symbol for gold?", &["Au", "Ag", "Gd"], 0),
            Question::new("Closest planet to the sun?", &["Venus", "Earth", "Mercury"], 2),
        ],
    )
}

pub fn broken_quiz() -> Quiz {
    let mut quiz = science_quiz();
    quiz.id = "quiz-broken".to_string();
    quiz.questions[2].correct_answer = 5;
    quiz
}

pub struct Harness {
    pub quiz_service: Arc<QuizService>,
    pub sessions: Arc<QuizSessionService>,
    pub results: Arc<InMemoryQuizResultRepository>,
}

/// Grades like [`PercentageScorer`] and counts how often it was asked to.
#[derive(Default)]
pub struct CountingScorer {
    calls: AtomicUsize,
}

impl CountingScorer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Scorer for CountingScorer {
    fn score(&self, quiz: &Quiz, answers: &Answers) -> AppResult<Grade> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        score_answers(quiz, answers)
    }
}

pub fn harness(tick_interval: Option<Duration>) -> Harness {
    harness_with_scorer(tick_interval, Arc::new(PercentageScorer))
}

pub fn harness_with_scorer(tick_interval: Option<Duration>, scorer: Arc<dyn Scorer>) -> Harness {
    build_harness(|quiz_service, results| {
        QuizSessionService::new(quiz_service, results, tick_interval).with_scorer(scorer)
    })
}

/// External clock, sessions left unstarted for `ttl` are swept.
pub fn idle_harness(ttl: Duration) -> Harness {
    build_harness(|quiz_service, results| {
        QuizSessionService::new(quiz_service, results, None).with_idle_ttl(ttl)
    })
}

fn build_harness(
    make_sessions: impl FnOnce(
        Arc<QuizService>,
        Arc<InMemoryQuizResultRepository>,
    ) -> QuizSessionService,
) -> Harness {
    let quiz_service = Arc::new(QuizService::new(Arc::new(
        InMemoryQuizRepository::with_quizzes(vec![science_quiz(), broken_quiz()]),
    )));
    let results = Arc::new(InMemoryQuizResultRepository::new());
    let sessions = Arc::new(make_sessions(quiz_service.clone(), results.clone()));

    Harness {
        quiz_service,
        sessions,
        results,
    }
}
