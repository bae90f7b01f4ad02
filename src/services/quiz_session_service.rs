use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{watch, Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{
            quiz_session::{SubmitOutcome, TickOutcome},
            QuizResult, QuizSession, SessionState,
        },
        dto::response::SessionView,
    },
    repositories::QuizResultRepository,
    services::{
        quiz_result_service::QuizResultService,
        quiz_service::QuizService,
        scoring_service::{PercentageScorer, Scorer},
    },
};

struct LiveSession {
    session: QuizSession,
    student_id: String,
    result: Option<QuizResult>,
    discarded: bool,
    created_at: Instant,
    updates: watch::Sender<SessionView>,
}

impl LiveSession {
    fn publish(&self, id: &str) -> SessionView {
        let view = SessionView::from_session(id, &self.session);
        self.updates.send_replace(view.clone());
        view
    }

    fn finalize(&mut self, id: &str) -> AppResult<QuizResult> {
        let result = QuizResultService::build_result(id, &self.student_id, &self.session)?;
        self.result = Some(result.clone());
        Ok(result)
    }

    fn is_idle(&self, ttl: Duration) -> bool {
        self.session.state() == SessionState::NotStarted && self.created_at.elapsed() >= ttl
    }
}

type SessionEntry = Arc<Mutex<LiveSession>>;
type Registry = Arc<RwLock<HashMap<String, SessionEntry>>>;

/// Hosts live quiz sessions.
///
/// Each session sits behind its own mutex, so a timer tick and a manual
/// submit arriving from different tasks are serialized; the session's own
/// state machine then lets only the first one complete it. Whichever call
/// completes the session builds the result and hands it to the result
/// repository, once. A session leaves the registry as soon as its result is
/// stored; later calls for it are answered from the result repository.
pub struct QuizSessionService {
    quiz_service: Arc<QuizService>,
    results: Arc<dyn QuizResultRepository>,
    sessions: Registry,
    scorer: Arc<dyn Scorer>,
    tick_interval: Option<Duration>,
    idle_ttl: Option<Duration>,
}

impl QuizSessionService {
    /// `tick_interval` of `None` leaves the clock to an external scheduler calling [`Self::tick`].
    pub fn new(
        quiz_service: Arc<QuizService>,
        results: Arc<dyn QuizResultRepository>,
        tick_interval: Option<Duration>,
    ) -> Self {
        Self {
            quiz_service,
            results,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            scorer: Arc::new(PercentageScorer),
            tick_interval,
            idle_ttl: None,
        }
    }

    /// Grade sessions created from now on with `scorer`.
    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Sessions still unstarted after `ttl` are dropped by [`Self::sweep_idle`].
    pub fn with_idle_ttl(mut self, ttl: Duration) -> Self {
        self.idle_ttl = Some(ttl);
        self
    }

    pub async fn create_session(&self, quiz_id: &str, student_id: &str) -> AppResult<SessionView> {
        let quiz = self.quiz_service.get_quiz(quiz_id).await?;
        let session = QuizSession::with_scorer(Arc::new(quiz), Arc::clone(&self.scorer))?;

        let id = Uuid::new_v4().to_string();
        let view = SessionView::from_session(&id, &session);
        let (updates, _) = watch::channel(view.clone());

        let entry = LiveSession {
            session,
            student_id: student_id.to_string(),
            result: None,
            discarded: false,
            created_at: Instant::now(),
            updates,
        };
        self.sessions
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(entry)));

        log::info!(
            "Created session {} for student {} on quiz {}",
            id,
            student_id,
            quiz_id
        );
        Ok(view)
    }

    async fn find(&self, id: &str) -> Option<SessionEntry> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn archived(&self, id: &str) -> AppResult<QuizResult> {
        self.results
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session with id '{}' not found", id)))
    }

    /// A live session that `action` may still change. Sessions whose result is
    /// already stored are reported as completed.
    async fn entry(&self, id: &str, action: &str) -> AppResult<SessionEntry> {
        match self.find(id).await {
            Some(entry) => Ok(entry),
            None => {
                self.archived(id).await?;
                Err(AppError::InvalidTransition(format!(
                    "cannot {}: session is {}",
                    action,
                    SessionState::Completed
                )))
            }
        }
    }

    pub async fn start(&self, id: &str) -> AppResult<SessionView> {
        let entry = self.entry(id, "start").await?;
        let view = {
            let mut live = entry.lock().await;
            live.session.start()?;
            live.publish(id)
        };

        log::info!(
            "Started session {} ({}s on the clock)",
            id,
            view.remaining_seconds
        );

        if let Some(period) = self.tick_interval {
            self.spawn_timer(id.to_string(), entry, period);
        }
        Ok(view)
    }

    fn spawn_timer(&self, id: String, entry: SessionEntry, period: Duration) {
        let results = Arc::clone(&self.results);
        let sessions = Arc::clone(&self.sessions);
        let elapsed = period.as_secs().clamp(1, u64::from(u32::MAX)) as u32;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // the first tick fires immediately
            interval.tick().await;

            loop {
                interval.tick().await;

                if entry.lock().await.discarded {
                    log::debug!("Timer for discarded session {} stopped", id);
                    break;
                }

                match advance_clock(&sessions, &entry, &id, elapsed, results.as_ref()).await {
                    Ok((TickOutcome::Running(_), _)) => continue,
                    Ok(_) => break,
                    Err(err) => {
                        log::error!("Timer for session {} stopped: {}", id, err);
                        break;
                    }
                }
            }
        });
    }

    /// Deliver `elapsed_seconds` of clock time from an external scheduler.
    ///
    /// Rejected while the service runs its own timer, so the clock has one source.
    pub async fn tick(&self, id: &str, elapsed_seconds: u32) -> AppResult<SessionView> {
        if self.tick_interval.is_some() {
            return Err(AppError::InvalidTransition(
                "cannot tick: the session clock is driven by the server timer".to_string(),
            ));
        }

        match self.find(id).await {
            Some(entry) => {
                let (_, view) = advance_clock(
                    &self.sessions,
                    &entry,
                    id,
                    elapsed_seconds,
                    self.results.as_ref(),
                )
                .await?;
                Ok(view)
            }
            None => Ok(SessionView::from_result(&self.archived(id).await?)),
        }
    }

    pub async fn select_answer(
        &self,
        id: &str,
        question_index: usize,
        option_index: usize,
    ) -> AppResult<SessionView> {
        let entry = self.entry(id, "select an answer").await?;
        let mut live = entry.lock().await;
        live.session.select_answer(question_index, option_index)?;
        Ok(live.publish(id))
    }

    pub async fn next_question(&self, id: &str) -> AppResult<SessionView> {
        let entry = self.entry(id, "navigate").await?;
        let mut live = entry.lock().await;
        live.session.go_to_next()?;
        Ok(live.publish(id))
    }

    pub async fn previous_question(&self, id: &str) -> AppResult<SessionView> {
        let entry = self.entry(id, "navigate").await?;
        let mut live = entry.lock().await;
        live.session.go_to_previous()?;
        Ok(live.publish(id))
    }

    pub async fn view(&self, id: &str) -> AppResult<SessionView> {
        match self.find(id).await {
            Some(entry) => {
                let live = entry.lock().await;
                Ok(SessionView::from_session(id, &live.session))
            }
            None => Ok(SessionView::from_result(&self.archived(id).await?)),
        }
    }

    pub async fn submit(&self, id: &str) -> AppResult<SessionView> {
        let Some(entry) = self.find(id).await else {
            log::debug!("Session {} already stored, submit ignored", id);
            return Ok(SessionView::from_result(&self.archived(id).await?));
        };

        let (view, record) = {
            let mut live = entry.lock().await;
            let record = match live.session.submit()? {
                SubmitOutcome::Completed(grade) => {
                    log::info!("Session {} submitted with score {}", id, grade.score);
                    Some(live.finalize(id)?)
                }
                SubmitOutcome::AlreadyCompleted => {
                    log::debug!("Session {} already completed, submit ignored", id);
                    None
                }
            };
            (live.publish(id), record)
        };

        if let Some(record) = record {
            hand_off(self.results.as_ref(), record).await?;
            retire(&self.sessions, id).await;
        }
        Ok(view)
    }

    /// The result of a completed session, read from the store once the session has left the registry.
    pub async fn result(&self, id: &str) -> AppResult<QuizResult> {
        match self.find(id).await {
            Some(entry) => {
                let live = entry.lock().await;
                live.result.clone().ok_or_else(|| {
                    AppError::InvalidState(format!(
                        "session '{}' is {}, no result yet",
                        id,
                        live.session.state()
                    ))
                })
            }
            None => self
                .results
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Result with id '{}' not found", id))),
        }
    }

    pub async fn results_for_student(&self, student_id: &str) -> AppResult<Vec<QuizResult>> {
        self.results.find_by_student(student_id).await
    }

    /// Watch a session's views. For a stored session the receiver holds the final view and never changes.
    pub async fn subscribe(&self, id: &str) -> AppResult<watch::Receiver<SessionView>> {
        match self.find(id).await {
            Some(entry) => {
                let live = entry.lock().await;
                Ok(live.updates.subscribe())
            }
            None => {
                let view = SessionView::from_result(&self.archived(id).await?);
                let (_, receiver) = watch::channel(view);
                Ok(receiver)
            }
        }
    }

    /// Drop a session from the registry. Its timer stops at the next tick.
    /// Discarding a session whose result is already stored does nothing.
    pub async fn discard(&self, id: &str) -> AppResult<()> {
        let removed = self.sessions.write().await.remove(id);
        let Some(entry) = removed else {
            self.archived(id).await?;
            return Ok(());
        };

        let mut live = entry.lock().await;
        live.discarded = true;
        if !live.session.is_completed() {
            log::warn!("Session {} discarded while {}", id, live.session.state());
        }
        Ok(())
    }

    /// Drop sessions that were never started within the idle TTL. Returns how many were dropped.
    pub async fn sweep_idle(&self) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| match entry.try_lock() {
            Ok(mut live) if live.is_idle(ttl) => {
                live.discarded = true;
                log::info!("Session {} dropped after {}s unstarted", id, ttl.as_secs());
                false
            }
            _ => true,
        });
        before - sessions.len()
    }

    /// Run [`Self::sweep_idle`] every idle TTL until the service is dropped.
    pub fn spawn_idle_sweeper(self: &Arc<Self>) {
        let Some(ttl) = self.idle_ttl else {
            return;
        };
        let weak: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(ttl);
            interval.tick().await;

            loop {
                interval.tick().await;
                let Some(service) = weak.upgrade() else {
                    break;
                };
                let dropped = service.sweep_idle().await;
                if dropped > 0 {
                    log::debug!("Idle sweep dropped {} sessions", dropped);
                }
            }
        });
    }

    pub async fn live_session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

async fn advance_clock(
    sessions: &Registry,
    entry: &Mutex<LiveSession>,
    id: &str,
    elapsed_seconds: u32,
    results: &dyn QuizResultRepository,
) -> AppResult<(TickOutcome, SessionView)> {
    let (outcome, view, record) = {
        let mut live = entry.lock().await;
        let outcome = live.session.tick(elapsed_seconds)?;
        let record = match outcome {
            TickOutcome::Expired(grade) => {
                log::info!("Session {} timed out with score {}", id, grade.score);
                Some(live.finalize(id)?)
            }
            TickOutcome::Running(_) | TickOutcome::AlreadyCompleted => None,
        };
        (outcome, live.publish(id), record)
    };

    if let Some(record) = record {
        hand_off(results, record).await?;
        retire(sessions, id).await;
    }
    Ok((outcome, view))
}

async fn hand_off(results: &dyn QuizResultRepository, record: QuizResult) -> AppResult<()> {
    let id = record.id.clone();
    match results.create(record).await {
        Ok(_) => {
            log::info!("Stored result for session {}", id);
            Ok(())
        }
        Err(err) => {
            log::error!("Failed to store result for session {}: {}", id, err);
            Err(err)
        }
    }
}

async fn retire(sessions: &Registry, id: &str) {
    if sessions.write().await.remove(id).is_some() {
        log::debug!("Session {} left the live registry", id);
    }
}
