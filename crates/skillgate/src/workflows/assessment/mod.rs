//! Timed technical assessment for a candidate role.
//!
//! A session resolves the role to a question bank, runs a countdown while the candidate
//! answers, and scores the answers exactly once when it completes by submission or expiry.
//! The result then branches into the proceed path or the remediation advisory.

pub mod answers;
pub mod bank;
pub mod countdown;
pub mod domain;
pub mod remediation;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;
pub mod views;

#[cfg(test)]
mod tests;

pub use answers::AnswerStore;
pub use bank::{
    normalize_role, BankDefinition, BankError, BankSelection, QuestionBankRepository,
    RoleSummary, DEFAULT_ROLE,
};
pub use countdown::{
    format_time_left, spawn_countdown, Clock, CountdownExit, CountdownHandle, IntervalClock,
    ManualClock, SharedSession, Ticker,
};
pub use domain::{
    budget_for, CompletionCause, GradingRule, Question, QuestionDefinition, QuestionKind,
    SessionId, SessionStatus, PASS_THRESHOLD_PERCENT, SECONDS_PER_QUESTION,
};
pub use remediation::{
    RemediationAction, RemediationBranch, RemediationController, RemediationDecision,
    RemediationError,
};
pub use repository::{AttemptRecord, AttemptRepository, DiscardAttempts, RepositoryError};
pub use router::assessment_router;
pub use scoring::{score, AssessmentResult, GradedAnswer};
pub use service::{
    AssessmentService, AssessmentServiceError, RemediationOutcome, DEFAULT_RETAINED_COMPLETED,
};
pub use session::{transition, IgnoredReason, Session, SessionEvent, Transition};
pub use views::{QuestionView, RemediationView, SessionView};
