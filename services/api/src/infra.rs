use metrics_exporter_prometheus::PrometheusHandle;
use skillgate::error::AppError;
use skillgate::workflows::assessment::{
    AttemptRecord, AttemptRepository, QuestionBankRepository, RepositoryError, SessionId,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Attempt store kept in process memory, newest attempts last.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAttemptRepository {
    records: Arc<Mutex<Vec<AttemptRecord>>>,
}

impl AttemptRepository for InMemoryAttemptRepository {
    fn record(&self, record: AttemptRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("attempt store mutex poisoned");
        guard.push(record);
        Ok(())
    }

    fn history(&self, session_id: &SessionId) -> Result<Vec<AttemptRecord>, RepositoryError> {
        let guard = self.records.lock().expect("attempt store mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.session_id == session_id)
            .cloned()
            .collect())
    }
}

impl InMemoryAttemptRepository {
    pub(crate) fn len(&self) -> usize {
        self.records
            .lock()
            .expect("attempt store mutex poisoned")
            .len()
    }
}

/// Bundled banks, with the rows of `bank_csv` replacing or adding roles when given.
pub(crate) fn load_banks(bank_csv: Option<&Path>) -> Result<QuestionBankRepository, AppError> {
    let banks = QuestionBankRepository::standard()?;
    let Some(path) = bank_csv else {
        return Ok(banks);
    };

    let definitions = QuestionBankRepository::definitions_from_csv_path(path)?;
    info!(path = %path.display(), banks = definitions.len(), "importing question banks");
    Ok(banks.with_overrides(definitions)?)
}
