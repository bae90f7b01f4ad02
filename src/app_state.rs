use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{MongoQuizRepository, MongoQuizResultRepository},
    services::{quiz_service::QuizService, quiz_session_service::QuizSessionService},
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub session_service: Arc<QuizSessionService>,
    pub db: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let quiz_repository = Arc::new(MongoQuizRepository::new(&db, &config.quizzes_collection));
        quiz_repository.ensure_indexes().await?;
        let quiz_service = Arc::new(QuizService::new(quiz_repository));

        let result_repository = Arc::new(MongoQuizResultRepository::new(
            &db,
            &config.results_collection,
        ));
        result_repository.ensure_indexes().await?;

        let mut session_service =
            QuizSessionService::new(quiz_service.clone(), result_repository, config.tick_interval());
        if let Some(ttl) = config.session_idle_ttl() {
            session_service = session_service.with_idle_ttl(ttl);
        }
        let session_service = Arc::new(session_service);
        session_service.spawn_idle_sweeper();

        Ok(Self {
            quiz_service,
            session_service,
            db: Some(db),
            config: Arc::new(config),
        })
    }

    /// State without a database connection, for tests and embedding with custom stores.
    pub fn from_services(
        quiz_service: Arc<QuizService>,
        session_service: Arc<QuizSessionService>,
        config: Config,
    ) -> Self {
        Self {
            quiz_service,
            session_service,
            db: None,
            config: Arc::new(config),
        }
    }
}
