use serde::Serialize;

use super::countdown::format_time_left;
use super::domain::{CompletionCause, Question, QuestionKind, SessionId, SessionStatus};
use super::remediation::{RemediationAction, RemediationBranch, RemediationController};
use super::scoring::AssessmentResult;
use super::session::Session;

/// Question as presented to the candidate; the answer key is never included.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub position: usize,
    pub prompt: String,
    pub kind: QuestionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl QuestionView {
    fn from_question(question: &Question, index: usize, session: &Session) -> Self {
        Self {
            id: question.id.clone(),
            position: index + 1,
            prompt: question.prompt.clone(),
            kind: question.kind,
            options: question.options().map(<[String]>::to_vec),
            points: question.points,
            answer: session.answers().get(&question.id).map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub requested_role: String,
    pub role: String,
    pub fallback_bank: bool,
    pub status: SessionStatus,
    pub attempt: u32,
    pub current_index: usize,
    pub question_count: usize,
    pub answered_count: usize,
    pub time_left_seconds: u32,
    pub time_left_display: String,
    pub budget_seconds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionCause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AssessmentResult>,
}

impl SessionView {
    pub fn new(session_id: &SessionId, session: &Session) -> Self {
        let current_question = match session.status() {
            SessionStatus::Active => session
                .current_question()
                .map(|question| QuestionView::from_question(question, session.current_index(), session)),
            _ => None,
        };

        Self {
            session_id: session_id.clone(),
            requested_role: session.requested_role().to_string(),
            role: session.role().to_string(),
            fallback_bank: session.used_fallback_bank(),
            status: session.status(),
            attempt: session.attempt(),
            current_index: session.current_index(),
            question_count: session.questions().len(),
            answered_count: session.answers().len(),
            time_left_seconds: session.time_left_seconds(),
            time_left_display: format_time_left(session.time_left_seconds()),
            budget_seconds: session.budget_seconds(),
            current_question,
            completion: session.completion(),
            result: session.result().cloned(),
        }
    }
}

/// Result screen payload combining the score with the remediation branch.
#[derive(Debug, Clone, Serialize)]
pub struct RemediationView {
    pub session_id: SessionId,
    pub result: AssessmentResult,
    pub time_taken_display: String,
    #[serde(flatten)]
    pub branch: RemediationBranch,
    pub actions: Vec<RemediationAction>,
    pub advisory_open: bool,
}

impl RemediationView {
    pub fn new(
        session_id: &SessionId,
        result: &AssessmentResult,
        controller: &RemediationController,
    ) -> Self {
        Self {
            session_id: session_id.clone(),
            result: result.clone(),
            time_taken_display: format_time_left(result.time_taken_seconds),
            branch: controller.branch().clone(),
            actions: controller.actions(),
            advisory_open: controller.advisory_open(),
        }
    }
}
