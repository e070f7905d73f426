use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use skillgate::workflows::assessment::{
    transition, AssessmentService, BankError, CompletionCause, DiscardAttempts, GradingRule,
    ManualClock, QuestionBankRepository, QuestionKind, RemediationAction, RemediationDecision,
    Session, SessionEvent, SessionStatus,
};

const EXTRA_BANK: &str = "\
role,id,type,prompt,options,reference_answer,points
Site Reliability Engineer,sre-slo,technical,What does an SLO define?,A target level of reliability|A billing plan|A release train,A target level of reliability,60
site reliability engineer,sre-pager,behavioral,How do you keep on-call sustainable?,,\"rotation, runbooks, blameless\",40
";

fn banks_with_sre() -> QuestionBankRepository {
    let definitions = QuestionBankRepository::definitions_from_csv_reader(Cursor::new(EXTRA_BANK))
        .expect("bank table parses");
    QuestionBankRepository::standard()
        .expect("bundled banks")
        .with_overrides(definitions)
        .expect("imported banks are valid")
}

#[test]
fn imported_banks_are_served_alongside_bundled_ones() {
    let banks = banks_with_sre();

    let selection = banks.lookup("SITE RELIABILITY ENGINEER");
    assert!(!selection.fallback);
    assert_eq!(selection.questions.len(), 2);
    assert_eq!(selection.questions[1].kind, QuestionKind::Behavioral);
    assert_eq!(
        selection.questions[1].rule,
        GradingRule::KeywordMatch {
            keywords: vec![
                "rotation".to_string(),
                "runbooks".to_string(),
                "blameless".to_string(),
            ]
        }
    );
    assert!(banks.contains("software engineer"));
    assert_eq!(banks.summaries().len(), 5);
}

#[test]
fn imported_banks_are_validated_before_use() {
    let table = "\
role,id,type,prompt,options,reference_answer,points
qa engineer,qa-1,technical,Pick one,yes|no,maybe,10
";
    let definitions = QuestionBankRepository::definitions_from_csv_reader(Cursor::new(table))
        .expect("bank table parses");

    match QuestionBankRepository::standard()
        .expect("bundled banks")
        .with_overrides(definitions)
    {
        Err(BankError::AnswerNotAnOption { id, .. }) => assert_eq!(id, "qa-1"),
        other => panic!("expected answer-not-an-option error, got {other:?}"),
    }
}

#[test]
fn pure_session_walkthrough_on_an_imported_bank() {
    let banks = banks_with_sre();
    let session = Session::briefed(banks.lookup("site reliability engineer"));
    assert_eq!(session.time_left_seconds(), 180);

    let session = transition(session, SessionEvent::Start);
    let session = transition(
        session,
        SessionEvent::Answer {
            question_id: "sre-slo".to_string(),
            text: "a target level of reliability".to_string(),
        },
    );
    let session = transition(session, SessionEvent::Tick { attempt: 1 });
    let session = transition(session, SessionEvent::Submit);

    assert_eq!(session.status(), SessionStatus::Completed);
    let result = session.result().expect("result");
    assert_eq!(result.score, 60);
    assert_eq!(result.percentage, 60);
    assert!(!result.passed);
    assert_eq!(result.weak_areas, vec![QuestionKind::Behavioral]);
    assert_eq!(result.time_taken_seconds, 1);
}

#[tokio::test]
async fn expired_session_can_be_retaken_after_remediation() {
    let clock = Arc::new(ManualClock::new());
    let service = AssessmentService::new(
        Arc::new(banks_with_sre()),
        Arc::new(DiscardAttempts),
        clock.clone(),
    );

    let session_id = service.create("site reliability engineer").session_id;
    service.start(&session_id).expect("start");
    service
        .answer(&session_id, "sre-pager", "Fair rotation and good runbooks")
        .expect("answer");

    clock.advance(180);
    let mut view = service.view(&session_id).expect("view");
    for _ in 0..200 {
        if view.status == SessionStatus::Completed {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        view = service.view(&session_id).expect("view");
    }

    assert_eq!(view.completion, Some(CompletionCause::TimeExpired));
    let result = view.result.expect("result");
    assert_eq!(result.score, 40);
    assert_eq!(result.time_taken_seconds, 180);

    let outcome = service
        .remediate(&session_id, RemediationAction::Restart)
        .expect("restart offered");
    assert_eq!(outcome.decision, RemediationDecision::RestartAssessment);
    assert_eq!(outcome.session.status, SessionStatus::Active);
    assert_eq!(outcome.session.time_left_seconds, 180);

    service
        .answer(&session_id, "sre-slo", "A target level of reliability")
        .expect("answer");
    service
        .answer(&session_id, "sre-pager", "Blameless reviews")
        .expect("answer");
    let retake = service.submit(&session_id).expect("submit");
    assert!(retake.passed);

    let view = service.result(&session_id).expect("result view");
    assert_eq!(view.actions, vec![RemediationAction::Proceed]);
}
