use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::countdown::Clock;
use super::domain::SessionId;
use super::remediation::{RemediationAction, RemediationError};
use super::repository::AttemptRepository;
use super::service::{AssessmentService, AssessmentServiceError};

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question_id: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub delta: isize,
}

#[derive(Debug, Deserialize)]
pub struct RemediationRequest {
    pub action: RemediationAction,
}

type Service<R, C> = Arc<AssessmentService<R, C>>;

/// Router builder exposing the assessment session lifecycle over HTTP.
pub fn assessment_router<R, C>(service: Service<R, C>) -> Router
where
    R: AttemptRepository + 'static,
    C: Clock,
{
    Router::new()
        .route("/api/v1/assessment/roles", get(roles_handler::<R, C>))
        .route("/api/v1/assessment/sessions", post(create_handler::<R, C>))
        .route(
            "/api/v1/assessment/sessions/:session_id",
            get(view_handler::<R, C>).delete(close_handler::<R, C>),
        )
        .route(
            "/api/v1/assessment/sessions/:session_id/start",
            post(start_handler::<R, C>),
        )
        .route(
            "/api/v1/assessment/sessions/:session_id/answers",
            put(answer_handler::<R, C>),
        )
        .route(
            "/api/v1/assessment/sessions/:session_id/navigate",
            post(navigate_handler::<R, C>),
        )
        .route(
            "/api/v1/assessment/sessions/:session_id/submit",
            post(submit_handler::<R, C>),
        )
        .route(
            "/api/v1/assessment/sessions/:session_id/restart",
            post(restart_handler::<R, C>),
        )
        .route(
            "/api/v1/assessment/sessions/:session_id/result",
            get(result_handler::<R, C>),
        )
        .route(
            "/api/v1/assessment/sessions/:session_id/remediation",
            post(remediation_handler::<R, C>),
        )
        .route(
            "/api/v1/assessment/sessions/:session_id/attempts",
            get(attempts_handler::<R, C>),
        )
        .with_state(service)
}

pub(crate) async fn roles_handler<R, C>(State(service): State<Service<R, C>>) -> Response
where
    R: AttemptRepository + 'static,
    C: Clock,
{
    (StatusCode::OK, axum::Json(service.roles())).into_response()
}

pub(crate) async fn create_handler<R, C>(
    State(service): State<Service<R, C>>,
    axum::Json(request): axum::Json<CreateSessionRequest>,
) -> Response
where
    R: AttemptRepository + 'static,
    C: Clock,
{
    let view = service.create(&request.role);
    (StatusCode::CREATED, axum::Json(view)).into_response()
}

pub(crate) async fn view_handler<R, C>(
    State(service): State<Service<R, C>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: AttemptRepository + 'static,
    C: Clock,
{
    respond(service.view(&SessionId(session_id)))
}

pub(crate) async fn close_handler<R, C>(
    State(service): State<Service<R, C>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: AttemptRepository + 'static,
    C: Clock,
{
    match service.close(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn start_handler<R, C>(
    State(service): State<Service<R, C>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: AttemptRepository + 'static,
    C: Clock,
{
    respond(service.start(&SessionId(session_id)))
}

pub(crate) async fn answer_handler<R, C>(
    State(service): State<Service<R, C>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<AnswerRequest>,
) -> Response
where
    R: AttemptRepository + 'static,
    C: Clock,
{
    respond(service.answer(&SessionId(session_id), &request.question_id, &request.text))
}

pub(crate) async fn navigate_handler<R, C>(
    State(service): State<Service<R, C>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<NavigateRequest>,
) -> Response
where
    R: AttemptRepository + 'static,
    C: Clock,
{
    respond(service.navigate(&SessionId(session_id), request.delta))
}

pub(crate) async fn submit_handler<R, C>(
    State(service): State<Service<R, C>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: AttemptRepository + 'static,
    C: Clock,
{
    respond(service.submit(&SessionId(session_id)))
}

pub(crate) async fn restart_handler<R, C>(
    State(service): State<Service<R, C>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: AttemptRepository + 'static,
    C: Clock,
{
    respond(service.restart(&SessionId(session_id)))
}

pub(crate) async fn result_handler<R, C>(
    State(service): State<Service<R, C>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: AttemptRepository + 'static,
    C: Clock,
{
    respond(service.result(&SessionId(session_id)))
}

pub(crate) async fn remediation_handler<R, C>(
    State(service): State<Service<R, C>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<RemediationRequest>,
) -> Response
where
    R: AttemptRepository + 'static,
    C: Clock,
{
    respond(service.remediate(&SessionId(session_id), request.action))
}

pub(crate) async fn attempts_handler<R, C>(
    State(service): State<Service<R, C>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: AttemptRepository + 'static,
    C: Clock,
{
    respond(service.history(&SessionId(session_id)))
}

fn respond<T: serde::Serialize>(outcome: Result<T, AssessmentServiceError>) -> Response {
    match outcome {
        Ok(body) => (StatusCode::OK, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

/// HTTP status for a service error.
pub fn status_for(error: &AssessmentServiceError) -> StatusCode {
    match error {
        AssessmentServiceError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        AssessmentServiceError::UnknownQuestion { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentServiceError::InvalidTransition { .. }
        | AssessmentServiceError::Remediation(RemediationError::Unavailable { .. }) => {
            StatusCode::CONFLICT
        }
        AssessmentServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: AssessmentServiceError) -> Response {
    let status = status_for(&error);
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
