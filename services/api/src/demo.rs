use crate::infra::{load_banks, InMemoryAttemptRepository};
use clap::Args;
use skillgate::error::AppError;
use skillgate::workflows::assessment::{
    format_time_left, AssessmentService, GradingRule, ManualClock, Question, QuestionKind,
    SessionStatus, SessionView, DEFAULT_ROLE,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct BanksArgs {
    /// Optional CSV table merged over the bundled banks
    #[arg(long)]
    pub(crate) bank_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Role to assess; roles without a bank run on the default bank
    #[arg(long, default_value = DEFAULT_ROLE)]
    pub(crate) role: String,
    /// Answer every question correctly instead of only the multiple-choice ones
    #[arg(long)]
    pub(crate) answer_all: bool,
    /// Let the countdown run out instead of submitting
    #[arg(long)]
    pub(crate) expire: bool,
    /// Optional CSV table merged over the bundled banks
    #[arg(long)]
    pub(crate) bank_csv: Option<PathBuf>,
}

pub(crate) fn run_banks(args: BanksArgs) -> Result<(), AppError> {
    let banks = load_banks(args.bank_csv.as_deref())?;

    println!("Question banks");
    for summary in banks.summaries() {
        let marker = if summary.is_default { " (default)" } else { "" };
        println!(
            "- {}{}: {} questions | {} points | {} on the clock",
            summary.role,
            marker,
            summary.question_count,
            summary.max_score,
            format_time_left(summary.budget_seconds)
        );
    }

    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        role,
        answer_all,
        expire,
        bank_csv,
    } = args;

    let banks = Arc::new(load_banks(bank_csv.as_deref())?);
    let questions = banks.lookup(&role).questions;
    let attempts = Arc::new(InMemoryAttemptRepository::default());
    let clock = Arc::new(ManualClock::new());
    let service = AssessmentService::new(banks, attempts.clone(), clock.clone());

    let briefing = service.create(&role);
    render_briefing(&briefing);

    let session_id = briefing.session_id;
    service.start(&session_id)?;

    for (position, question) in questions.iter().enumerate() {
        let answer = demo_answer(question, answer_all);
        let shown = answer.as_deref().unwrap_or("(skipped)");
        println!(
            "  Q{} [{}] {} -> {}",
            position + 1,
            question.kind.label(),
            question.prompt,
            shown
        );
        if let Some(text) = answer {
            service.answer(&session_id, &question.id, &text)?;
        }
        service.navigate(&session_id, 1)?;
    }

    if expire {
        clock.advance(briefing.budget_seconds);
        wait_for_completion(&service, &session_id).await;
    }
    let result = service.submit(&session_id)?;
    let view = service.result(&session_id)?;

    println!("\nResult");
    println!("- {}", result.summary());
    println!(
        "- completed by {} after {}",
        service
            .view(&session_id)?
            .completion
            .map(|cause| cause.label())
            .unwrap_or("submission"),
        view.time_taken_display
    );
    if !result.weak_areas.is_empty() {
        println!("- weak areas: {}", weak_area_labels(&result.weak_areas));
    }
    let actions: Vec<String> = view
        .actions
        .iter()
        .map(|action| format!("{action:?}"))
        .collect();
    println!("- next steps: {}", actions.join(", "));
    println!("- attempts recorded: {}", attempts.len());

    Ok(())
}

fn render_briefing(view: &SessionView) {
    println!("Assessment briefing for '{}'", view.requested_role);
    if view.fallback_bank {
        println!("- no bank for this role, using the '{}' bank", view.role);
    }
    println!(
        "- {} questions | {} on the clock",
        view.question_count, view.time_left_display
    );
}

fn demo_answer(question: &Question, answer_all: bool) -> Option<String> {
    match &question.rule {
        GradingRule::ExactMatch { answer, .. } => Some(answer.clone()),
        GradingRule::KeywordMatch { keywords } if answer_all => keywords
            .first()
            .map(|keyword| format!("I would start with {keyword}")),
        GradingRule::KeywordMatch { .. } => None,
    }
}

fn weak_area_labels(kinds: &[QuestionKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.label())
        .collect::<Vec<_>>()
        .join(", ")
}

async fn wait_for_completion(
    service: &AssessmentService<InMemoryAttemptRepository, ManualClock>,
    session_id: &skillgate::workflows::assessment::SessionId,
) {
    for _ in 0..500 {
        match service.view(session_id) {
            Ok(view) if view.status == SessionStatus::Completed => return,
            Ok(_) => tokio::time::sleep(Duration::from_millis(2)).await,
            Err(_) => return,
        }
    }
}
