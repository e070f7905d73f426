use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use super::bank::{QuestionBankRepository, RoleSummary};
use super::countdown::{spawn_countdown, Clock, CountdownHandle, SharedSession};
use super::domain::{SessionId, SessionStatus};
use super::remediation::{
    RemediationAction, RemediationController, RemediationDecision, RemediationError,
};
use super::repository::{AttemptRecord, AttemptRepository, RepositoryError};
use super::scoring::AssessmentResult;
use super::session::{IgnoredReason, Session, SessionEvent, Transition};
use super::views::{RemediationView, SessionView};

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error("session {0} not found")]
    SessionNotFound(SessionId),
    #[error("question '{question_id}' is not part of session {session_id}")]
    UnknownQuestion {
        session_id: SessionId,
        question_id: String,
    },
    #[error("cannot {action} while the session is {status}")]
    InvalidTransition {
        action: &'static str,
        status: SessionStatus,
    },
    #[error(transparent)]
    Remediation(#[from] RemediationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Outcome of a remediation choice, with the session state it left behind.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RemediationOutcome {
    pub decision: RemediationDecision,
    pub session: SessionView,
}

/// Completed sessions kept in memory unless the host configures otherwise.
pub const DEFAULT_RETAINED_COMPLETED: usize = 256;

struct SessionSlot {
    sequence: u64,
    session: SharedSession,
    countdown: Option<CountdownHandle>,
    remediation: Option<(u32, RemediationController)>,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> (u64, SessionId) {
    let sequence = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    (sequence, SessionId(format!("session-{sequence:06}")))
}

/// Service owning live sessions, their countdowns, and the attempt store hook.
///
/// Sessions leave the registry on [`close`](Self::close). Completed sessions beyond the
/// retention limit are also evicted, oldest first, whenever a new session is created.
pub struct AssessmentService<R, C> {
    banks: Arc<QuestionBankRepository>,
    attempts: Arc<R>,
    clock: Arc<C>,
    retained_completed: usize,
    sessions: Mutex<HashMap<SessionId, SessionSlot>>,
}

impl<R, C> AssessmentService<R, C>
where
    R: AttemptRepository + 'static,
    C: Clock,
{
    pub fn new(banks: Arc<QuestionBankRepository>, attempts: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            banks,
            attempts,
            clock,
            retained_completed: DEFAULT_RETAINED_COMPLETED,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_retained_completed(mut self, limit: usize) -> Self {
        self.retained_completed = limit;
        self
    }

    pub fn roles(&self) -> Vec<RoleSummary> {
        self.banks.summaries()
    }

    /// Resolves the role's bank and opens a briefed session.
    pub fn create(&self, role: &str) -> SessionView {
        let mut session = Session::loading(role);
        let selection = self.banks.lookup(role);
        session.apply(SessionEvent::Briefed(selection));

        let (sequence, session_id) = next_session_id();
        info!(
            session = %session_id,
            requested = %role,
            bank = %session.role(),
            fallback = session.used_fallback_bank(),
            questions = session.questions().len(),
            "assessment session briefed"
        );

        let view = SessionView::new(&session_id, &session);
        self.lock_sessions().insert(
            session_id,
            SessionSlot {
                sequence,
                session: Arc::new(Mutex::new(session)),
                countdown: None,
                remediation: None,
            },
        );
        self.evict_completed();
        view
    }

    pub fn view(&self, session_id: &SessionId) -> Result<SessionView, AssessmentServiceError> {
        let session = self.session(session_id)?;
        let guard = session.lock().expect("session mutex poisoned");
        Ok(SessionView::new(session_id, &guard))
    }

    pub fn start(&self, session_id: &SessionId) -> Result<SessionView, AssessmentServiceError> {
        let session = self.session(session_id)?;
        let (transition, view) = self.apply(session_id, &session, SessionEvent::Start);

        match transition {
            Transition::Started { attempt } => {
                info!(session = %session_id, attempt, "assessment started");
                self.arm_countdown(session_id, session);
                Ok(view)
            }
            other => Err(rejected("start", other, session_id, None)),
        }
    }

    pub fn answer(
        &self,
        session_id: &SessionId,
        question_id: &str,
        text: &str,
    ) -> Result<SessionView, AssessmentServiceError> {
        let session = self.session(session_id)?;
        let (transition, view) = self.apply(
            session_id,
            &session,
            SessionEvent::Answer {
                question_id: question_id.to_string(),
                text: text.to_string(),
            },
        );

        match transition {
            Transition::Answered => Ok(view),
            other => Err(rejected("answer", other, session_id, Some(question_id))),
        }
    }

    /// Moves the current question; moving past either end leaves it unchanged.
    pub fn navigate(
        &self,
        session_id: &SessionId,
        delta: isize,
    ) -> Result<SessionView, AssessmentServiceError> {
        let session = self.session(session_id)?;
        let (transition, view) = self.apply(session_id, &session, SessionEvent::Navigate(delta));

        match transition {
            Transition::Moved { .. } | Transition::Ignored(IgnoredReason::AtBoundary) => Ok(view),
            other => Err(rejected("navigate", other, session_id, None)),
        }
    }

    /// Completes the session. Submitting an already completed session returns its result.
    pub fn submit(
        &self,
        session_id: &SessionId,
    ) -> Result<AssessmentResult, AssessmentServiceError> {
        let session = self.session(session_id)?;
        let mut guard = session.lock().expect("session mutex poisoned");

        let transition = guard.apply(SessionEvent::Submit);
        let completed = matches!(transition, Transition::Completed(_));
        let record = if completed {
            AttemptRecord::from_session(session_id, &guard)
        } else {
            None
        };
        let result = guard.result().cloned();
        let status = guard.status();
        drop(guard);

        if completed {
            self.disarm_countdown(session_id);
        }
        if let Some(record) = record {
            log_completion(&record);
            self.attempts.record(record)?;
        }

        result.ok_or(AssessmentServiceError::InvalidTransition {
            action: "submit",
            status,
        })
    }

    /// Resets answers and the clock and starts a fresh attempt over the same questions.
    pub fn restart(&self, session_id: &SessionId) -> Result<SessionView, AssessmentServiceError> {
        let session = self.session(session_id)?;
        let (transition, view) = self.apply(session_id, &session, SessionEvent::Restart);

        match transition {
            Transition::Restarted { attempt } => {
                info!(session = %session_id, attempt, "assessment restarted");
                self.disarm_countdown(session_id);
                self.arm_countdown(session_id, session);
                Ok(view)
            }
            other => Err(rejected("restart", other, session_id, None)),
        }
    }

    /// Result screen for a completed session.
    pub fn result(&self, session_id: &SessionId) -> Result<RemediationView, AssessmentServiceError> {
        self.with_remediation(session_id, |result, controller| {
            Ok(RemediationView::new(session_id, result, controller))
        })
    }

    pub fn remediate(
        &self,
        session_id: &SessionId,
        action: RemediationAction,
    ) -> Result<RemediationOutcome, AssessmentServiceError> {
        let decision =
            self.with_remediation(session_id, |_, controller| Ok(controller.choose(action)?))?;

        let session = match decision {
            RemediationDecision::RestartAssessment => self.restart(session_id)?,
            RemediationDecision::ProceedToOpportunities | RemediationDecision::StayOnResult => {
                self.view(session_id)?
            }
        };

        Ok(RemediationOutcome { decision, session })
    }

    pub fn history(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<AttemptRecord>, AssessmentServiceError> {
        Ok(self.attempts.history(session_id)?)
    }

    /// Drops the session and cancels its countdown.
    pub fn close(&self, session_id: &SessionId) -> Result<(), AssessmentServiceError> {
        let slot = self
            .lock_sessions()
            .remove(session_id)
            .ok_or_else(|| AssessmentServiceError::SessionNotFound(session_id.clone()))?;

        if let Some(countdown) = slot.countdown {
            countdown.cancel();
        }
        info!(session = %session_id, "assessment session closed");
        Ok(())
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, SessionSlot>> {
        self.sessions.lock().expect("session registry mutex poisoned")
    }

    fn session(&self, session_id: &SessionId) -> Result<SharedSession, AssessmentServiceError> {
        self.lock_sessions()
            .get(session_id)
            .map(|slot| Arc::clone(&slot.session))
            .ok_or_else(|| AssessmentServiceError::SessionNotFound(session_id.clone()))
    }

    fn apply(
        &self,
        session_id: &SessionId,
        session: &SharedSession,
        event: SessionEvent,
    ) -> (Transition, SessionView) {
        let mut guard = session.lock().expect("session mutex poisoned");
        let transition = guard.apply(event);
        (transition, SessionView::new(session_id, &guard))
    }

    fn arm_countdown(&self, session_id: &SessionId, session: SharedSession) {
        let attempts = Arc::clone(&self.attempts);
        let id = session_id.clone();
        let handle = spawn_countdown(session, self.clock.ticker(), move |session| {
            let Some(record) = AttemptRecord::from_session(&id, session) else {
                return;
            };
            log_completion(&record);
            if let Err(err) = attempts.record(record) {
                warn!(session = %id, error = %err, "failed to record expired attempt");
            }
        });

        let replaced = match self.lock_sessions().get_mut(session_id) {
            Some(slot) => slot.countdown.replace(handle),
            None => Some(handle),
        };
        if let Some(stale) = replaced {
            stale.cancel();
        }
    }

    fn disarm_countdown(&self, session_id: &SessionId) {
        let handle = self
            .lock_sessions()
            .get_mut(session_id)
            .and_then(|slot| slot.countdown.take());
        if let Some(handle) = handle {
            handle.cancel();
        }
    }

    /// Drops the oldest completed sessions past the retention limit. Sessions whose lock is
    /// held elsewhere are in use and are kept.
    fn evict_completed(&self) {
        let mut sessions = self.lock_sessions();
        let mut completed: Vec<(u64, SessionId)> = sessions
            .iter()
            .filter(|(_, slot)| is_completed(&slot.session))
            .map(|(id, slot)| (slot.sequence, id.clone()))
            .collect();

        let excess = completed.len().saturating_sub(self.retained_completed);
        if excess == 0 {
            return;
        }
        completed.sort_unstable();

        let mut evicted = 0;
        for (_, session_id) in completed.into_iter().take(excess) {
            let Some(session) = sessions.get(&session_id).map(|slot| Arc::clone(&slot.session))
            else {
                continue;
            };
            let guard = match session.try_lock() {
                Ok(guard) if guard.status() == SessionStatus::Completed => guard,
                _ => continue,
            };
            if let Some(slot) = sessions.remove(&session_id) {
                if let Some(countdown) = slot.countdown {
                    countdown.cancel();
                }
                evicted += 1;
            }
            drop(guard);
        }
        debug!(evicted, retained = self.retained_completed, "completed sessions evicted");
    }

    fn with_remediation<T>(
        &self,
        session_id: &SessionId,
        f: impl FnOnce(&AssessmentResult, &mut RemediationController) -> Result<T, AssessmentServiceError>,
    ) -> Result<T, AssessmentServiceError> {
        let session = self.session(session_id)?;
        let (attempt, result) = {
            let guard = session.lock().expect("session mutex poisoned");
            match guard.result() {
                Some(result) => (guard.attempt(), result.clone()),
                None => {
                    return Err(AssessmentServiceError::InvalidTransition {
                        action: "view the result",
                        status: guard.status(),
                    })
                }
            }
        };

        let mut sessions = self.lock_sessions();
        let slot = sessions
            .get_mut(session_id)
            .ok_or_else(|| AssessmentServiceError::SessionNotFound(session_id.clone()))?;

        let stale = slot
            .remediation
            .as_ref()
            .map_or(true, |(seen, _)| *seen != attempt);
        if stale {
            slot.remediation = Some((attempt, RemediationController::from_result(&result)));
        }
        let (_, controller) = slot
            .remediation
            .get_or_insert_with(|| (attempt, RemediationController::from_result(&result)));

        f(&result, controller)
    }
}

fn is_completed(session: &SharedSession) -> bool {
    session
        .try_lock()
        .map_or(false, |guard| guard.status() == SessionStatus::Completed)
}

fn rejected(
    action: &'static str,
    transition: Transition,
    session_id: &SessionId,
    question_id: Option<&str>,
) -> AssessmentServiceError {
    match transition {
        Transition::Ignored(IgnoredReason::UnknownQuestion) => {
            AssessmentServiceError::UnknownQuestion {
                session_id: session_id.clone(),
                question_id: question_id.unwrap_or_default().to_string(),
            }
        }
        Transition::Ignored(IgnoredReason::WrongStatus(status)) => {
            AssessmentServiceError::InvalidTransition { action, status }
        }
        _ => AssessmentServiceError::InvalidTransition {
            action,
            status: SessionStatus::Active,
        },
    }
}

fn log_completion(record: &AttemptRecord) {
    info!(
        session = %record.session_id,
        role = %record.role,
        attempt = record.attempt,
        cause = record.cause.label(),
        score = record.result.score,
        percentage = record.result.percentage,
        passed = record.result.passed,
        "assessment completed"
    );
}
