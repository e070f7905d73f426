use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use serde_json::Value;
use tower::ServiceExt;

use crate::workflows::assessment::bank::{BankSelection, QuestionBankRepository};
use crate::workflows::assessment::countdown::ManualClock;
use crate::workflows::assessment::domain::{
    GradingRule, Question, QuestionKind, SessionId, SessionStatus,
};
use crate::workflows::assessment::repository::{
    AttemptRecord, AttemptRepository, RepositoryError,
};
use crate::workflows::assessment::service::AssessmentService;
use crate::workflows::assessment::session::{Session, SessionEvent};
use crate::workflows::assessment::views::SessionView;

/// Correct answer for every software engineer question, in bank order.
pub(super) const CORRECT_ANSWERS: [(&str, &str); 8] = [
    ("se-binary-search", "O(log n)"),
    ("se-lifo", "Stack"),
    ("se-error-handling", "I wrap risky calls in try-except blocks"),
    ("se-team-conflict", "I listened to both sides and we reached a compromise"),
    ("se-latency-spike", "Check the logs and metrics for the slow endpoints"),
    ("se-idempotent-method", "PUT"),
    ("se-broken-release", "Rollback to the previous build first"),
    ("se-sql-join", "Combines rows from two or more tables"),
];

/// The four ten-point questions of the software engineer bank.
pub(super) const TEN_POINT_ANSWERS: [(&str, &str); 4] = [
    ("se-binary-search", "O(log n)"),
    ("se-lifo", "Stack"),
    ("se-idempotent-method", "PUT"),
    ("se-sql-join", "Combines rows from two or more tables"),
];

pub(super) fn banks() -> QuestionBankRepository {
    QuestionBankRepository::standard().expect("bundled banks are valid")
}

pub(super) fn software_engineer() -> BankSelection {
    banks().lookup("Software Engineer")
}

pub(super) fn active_session() -> Session {
    let mut session = Session::briefed(software_engineer());
    session.apply(SessionEvent::Start);
    assert_eq!(session.status(), SessionStatus::Active);
    session
}

pub(super) fn answer_all(session: &mut Session, answers: &[(&str, &str)]) {
    for (question_id, text) in answers {
        session.apply(SessionEvent::Answer {
            question_id: question_id.to_string(),
            text: text.to_string(),
        });
    }
}

pub(super) fn multiple_choice(id: &str, kind: QuestionKind, answer: &str, points: u32) -> Question {
    Question {
        id: id.to_string(),
        prompt: format!("prompt for {id}"),
        kind,
        rule: GradingRule::ExactMatch {
            options: vec!["wrong".to_string(), answer.to_string()],
            answer: answer.to_string(),
        },
        points,
    }
}

pub(super) fn keyword(id: &str, kind: QuestionKind, reference: &str, points: u32) -> Question {
    Question {
        id: id.to_string(),
        prompt: format!("prompt for {id}"),
        kind,
        rule: GradingRule::KeywordMatch {
            keywords: GradingRule::keywords_from_reference(reference),
        },
        points,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAttempts {
    records: Arc<Mutex<Vec<AttemptRecord>>>,
}

impl MemoryAttempts {
    pub(super) fn records(&self) -> Vec<AttemptRecord> {
        self.records.lock().expect("attempt mutex poisoned").clone()
    }
}

impl AttemptRepository for MemoryAttempts {
    fn record(&self, record: AttemptRecord) -> Result<(), RepositoryError> {
        self.records
            .lock()
            .expect("attempt mutex poisoned")
            .push(record);
        Ok(())
    }

    fn history(&self, session_id: &SessionId) -> Result<Vec<AttemptRecord>, RepositoryError> {
        let guard = self.records.lock().expect("attempt mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.session_id == session_id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableAttempts;

impl AttemptRepository for UnavailableAttempts {
    fn record(&self, _record: AttemptRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("attempt store offline".to_string()))
    }

    fn history(&self, _session_id: &SessionId) -> Result<Vec<AttemptRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("attempt store offline".to_string()))
    }
}

pub(super) type TestService = AssessmentService<MemoryAttempts, ManualClock>;

pub(super) fn build_service() -> (Arc<TestService>, Arc<MemoryAttempts>, Arc<ManualClock>) {
    let attempts = Arc::new(MemoryAttempts::default());
    let clock = Arc::new(ManualClock::new());
    let service = AssessmentService::new(Arc::new(banks()), attempts.clone(), clock.clone());
    (Arc::new(service), attempts, clock)
}

pub(super) fn started_session(service: &TestService, role: &str) -> SessionId {
    let created = service.create(role);
    service
        .start(&created.session_id)
        .expect("briefed session starts");
    created.session_id
}

/// Yields to the countdown task until `condition` holds for the session view.
pub(super) async fn wait_for(
    service: &TestService,
    session_id: &SessionId,
    condition: impl Fn(&SessionView) -> bool,
) -> SessionView {
    for _ in 0..200 {
        let view = service.view(session_id).expect("session exists");
        if condition(&view) {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("session {session_id} never reached the expected state");
}

pub(super) async fn send(router: &axum::Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serializable body")))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    };

    router
        .clone()
        .oneshot(request)
        .await
        .expect("route executes")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_conflict_response(response: Response) {
    assert_eq!(response.status(), axum::http::StatusCode::CONFLICT);
}
