use std::sync::Arc;

use super::answers::AnswerStore;
use super::bank::BankSelection;
use super::domain::{budget_for, CompletionCause, Question, SessionStatus};
use super::scoring::{self, AssessmentResult};

/// Input driving the session state machine.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Bank lookup finished; moves `Loading` to `Briefed`.
    Briefed(BankSelection),
    Start,
    Answer { question_id: String, text: String },
    /// Relative move. A delta past either end lands on the first or last question.
    Navigate(isize),
    /// One elapsed second, stamped with the attempt the ticking countdown belongs to.
    Tick { attempt: u32 },
    Submit,
    Restart,
}

/// Why an event left the session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    WrongStatus(SessionStatus),
    UnknownQuestion,
    AtBoundary,
    StaleTick,
}

/// Observable effect of applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Briefed,
    Started { attempt: u32 },
    Answered,
    Moved { index: usize },
    Ticked { time_left_seconds: u32 },
    Completed(CompletionCause),
    Restarted { attempt: u32 },
    Ignored(IgnoredReason),
}

/// One attempt at an assessment for a resolved role.
#[derive(Debug, Clone)]
pub struct Session {
    requested_role: String,
    role: String,
    fallback_bank: bool,
    questions: Arc<[Question]>,
    answers: AnswerStore,
    current_index: usize,
    time_left_seconds: u32,
    status: SessionStatus,
    attempt: u32,
    completion: Option<CompletionCause>,
    result: Option<AssessmentResult>,
}

/// Applies `event` to `session` and returns the successor state.
pub fn transition(mut session: Session, event: SessionEvent) -> Session {
    session.apply(event);
    session
}

impl Session {
    pub fn loading(role: &str) -> Self {
        Self {
            requested_role: role.to_string(),
            role: String::new(),
            fallback_bank: false,
            questions: Arc::from(Vec::new()),
            answers: AnswerStore::new(),
            current_index: 0,
            time_left_seconds: 0,
            status: SessionStatus::Loading,
            attempt: 0,
            completion: None,
            result: None,
        }
    }

    /// Convenience for a session whose bank is already resolved.
    pub fn briefed(selection: BankSelection) -> Self {
        let role = selection.requested_role.clone();
        transition(Self::loading(&role), SessionEvent::Briefed(selection))
    }

    pub fn apply(&mut self, event: SessionEvent) -> Transition {
        match event {
            SessionEvent::Briefed(selection) => self.brief(selection),
            SessionEvent::Start => self.start(),
            SessionEvent::Answer { question_id, text } => self.answer(question_id, text),
            SessionEvent::Navigate(delta) => self.navigate(delta),
            SessionEvent::Tick { attempt } => self.tick(attempt),
            SessionEvent::Submit => self.submit(),
            SessionEvent::Restart => self.restart(),
        }
    }

    fn brief(&mut self, selection: BankSelection) -> Transition {
        if self.status != SessionStatus::Loading {
            return Transition::Ignored(IgnoredReason::WrongStatus(self.status));
        }

        self.role = selection.role;
        self.fallback_bank = selection.fallback;
        self.questions = selection.questions;
        self.reset_attempt_state();
        self.status = SessionStatus::Briefed;
        Transition::Briefed
    }

    fn start(&mut self) -> Transition {
        if self.status != SessionStatus::Briefed {
            return Transition::Ignored(IgnoredReason::WrongStatus(self.status));
        }

        self.attempt += 1;
        self.status = SessionStatus::Active;
        Transition::Started {
            attempt: self.attempt,
        }
    }

    fn answer(&mut self, question_id: String, text: String) -> Transition {
        if self.status != SessionStatus::Active {
            return Transition::Ignored(IgnoredReason::WrongStatus(self.status));
        }
        if !self.questions.iter().any(|question| question.id == question_id) {
            return Transition::Ignored(IgnoredReason::UnknownQuestion);
        }

        self.answers.upsert(question_id, text);
        Transition::Answered
    }

    fn navigate(&mut self, delta: isize) -> Transition {
        if self.status != SessionStatus::Active {
            return Transition::Ignored(IgnoredReason::WrongStatus(self.status));
        }

        let last = self.questions.len().saturating_sub(1);
        let target = if delta.is_negative() {
            self.current_index.saturating_sub(delta.unsigned_abs())
        } else {
            self.current_index.saturating_add(delta.unsigned_abs()).min(last)
        };

        if target == self.current_index {
            return Transition::Ignored(IgnoredReason::AtBoundary);
        }

        self.current_index = target;
        Transition::Moved { index: target }
    }

    fn tick(&mut self, attempt: u32) -> Transition {
        if self.status != SessionStatus::Active {
            return Transition::Ignored(IgnoredReason::WrongStatus(self.status));
        }
        if attempt != self.attempt {
            return Transition::Ignored(IgnoredReason::StaleTick);
        }

        self.time_left_seconds = self.time_left_seconds.saturating_sub(1);
        if self.time_left_seconds == 0 {
            return self.complete(CompletionCause::TimeExpired);
        }

        Transition::Ticked {
            time_left_seconds: self.time_left_seconds,
        }
    }

    fn submit(&mut self) -> Transition {
        if self.status != SessionStatus::Active {
            return Transition::Ignored(IgnoredReason::WrongStatus(self.status));
        }
        self.complete(CompletionCause::Submitted)
    }

    fn restart(&mut self) -> Transition {
        if !matches!(
            self.status,
            SessionStatus::Active | SessionStatus::Completed
        ) {
            return Transition::Ignored(IgnoredReason::WrongStatus(self.status));
        }

        self.reset_attempt_state();
        self.attempt += 1;
        self.status = SessionStatus::Active;
        Transition::Restarted {
            attempt: self.attempt,
        }
    }

    // Sole path out of Active; scoring runs here and nowhere else.
    fn complete(&mut self, cause: CompletionCause) -> Transition {
        self.result = Some(scoring::score(
            &self.questions,
            &self.answers,
            self.time_left_seconds,
        ));
        self.completion = Some(cause);
        self.status = SessionStatus::Completed;
        Transition::Completed(cause)
    }

    fn reset_attempt_state(&mut self) {
        self.answers.clear();
        self.current_index = 0;
        self.time_left_seconds = self.budget_seconds();
        self.completion = None;
        self.result = None;
    }

    pub fn requested_role(&self) -> &str {
        &self.requested_role
    }

    /// Normalized key of the bank the session runs on.
    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn used_fallback_bank(&self) -> bool {
        self.fallback_bank
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn time_left_seconds(&self) -> u32 {
        self.time_left_seconds
    }

    pub fn budget_seconds(&self) -> u32 {
        budget_for(self.questions.len())
    }

    /// Countdown generation; bumped on every start and restart.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn completion(&self) -> Option<CompletionCause> {
        self.completion
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        self.result.as_ref()
    }
}
