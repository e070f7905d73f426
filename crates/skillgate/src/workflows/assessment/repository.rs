use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CompletionCause, SessionId};
use super::scoring::AssessmentResult;
use super::session::Session;

/// Completed attempt handed to the host's store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub session_id: SessionId,
    pub role: String,
    pub attempt: u32,
    pub cause: CompletionCause,
    pub result: AssessmentResult,
    pub completed_at: DateTime<Utc>,
}

impl AttemptRecord {
    /// Snapshot of a completed session; `None` while the session is still running.
    pub fn from_session(session_id: &SessionId, session: &Session) -> Option<Self> {
        let result = session.result()?.clone();
        let cause = session.completion()?;

        Some(Self {
            session_id: session_id.clone(),
            role: session.role().to_string(),
            attempt: session.attempt(),
            cause,
            result,
            completed_at: Utc::now(),
        })
    }
}

/// Optional host-side storage for completed attempts.
pub trait AttemptRepository: Send + Sync {
    fn record(&self, record: AttemptRecord) -> Result<(), RepositoryError>;
    fn history(&self, session_id: &SessionId) -> Result<Vec<AttemptRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("attempt store unavailable: {0}")]
    Unavailable(String),
}

/// Store that keeps nothing, for hosts that do not persist attempts.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardAttempts;

impl AttemptRepository for DiscardAttempts {
    fn record(&self, _record: AttemptRecord) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn history(&self, _session_id: &SessionId) -> Result<Vec<AttemptRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}
