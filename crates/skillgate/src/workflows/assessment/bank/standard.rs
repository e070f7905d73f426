use super::super::domain::{QuestionDefinition, QuestionKind};
use super::BankDefinition;

/// Bank used whenever a role has no table entry of its own.
pub const DEFAULT_ROLE: &str = "software engineer";

pub(super) fn bank_definitions() -> Vec<BankDefinition> {
    vec![
        BankDefinition {
            role: DEFAULT_ROLE.to_string(),
            questions: software_engineer(),
        },
        BankDefinition {
            role: "data scientist".to_string(),
            questions: data_scientist(),
        },
        BankDefinition {
            role: "frontend developer".to_string(),
            questions: frontend_developer(),
        },
        BankDefinition {
            role: "product manager".to_string(),
            questions: product_manager(),
        },
    ]
}

fn choice(
    id: &str,
    kind: QuestionKind,
    prompt: &str,
    options: &[&str],
    answer: &str,
    points: u32,
) -> QuestionDefinition {
    QuestionDefinition {
        id: id.to_string(),
        prompt: prompt.to_string(),
        kind,
        options: Some(options.iter().map(|option| option.to_string()).collect()),
        reference_answer: answer.to_string(),
        points,
    }
}

fn open(id: &str, kind: QuestionKind, prompt: &str, keywords: &str, points: u32) -> QuestionDefinition {
    QuestionDefinition {
        id: id.to_string(),
        prompt: prompt.to_string(),
        kind,
        options: None,
        reference_answer: keywords.to_string(),
        points,
    }
}

fn software_engineer() -> Vec<QuestionDefinition> {
    vec![
        choice(
            "se-binary-search",
            QuestionKind::Technical,
            "What is the time complexity of binary search on a sorted array?",
            &["O(n)", "O(log n)", "O(n log n)", "O(1)"],
            "O(log n)",
            10,
        ),
        choice(
            "se-lifo",
            QuestionKind::Technical,
            "Which data structure serves elements in last-in, first-out order?",
            &["Queue", "Stack", "Heap", "Linked list"],
            "Stack",
            10,
        ),
        open(
            "se-error-handling",
            QuestionKind::Technical,
            "How do you handle errors and exceptions in a Python service?",
            "try-except blocks, with specific exception types and finally blocks for cleanup",
            15,
        ),
        open(
            "se-team-conflict",
            QuestionKind::Behavioral,
            "Describe a time you resolved a disagreement within your team.",
            "listened, compromise, communication, empathy, feedback",
            15,
        ),
        open(
            "se-latency-spike",
            QuestionKind::Scenario,
            "API latency in production spikes without a deploy. How do you investigate?",
            "logs, metrics, profiling, monitoring, tracing",
            15,
        ),
        choice(
            "se-idempotent-method",
            QuestionKind::Technical,
            "Which HTTP method is defined as idempotent?",
            &["POST", "PUT", "PATCH", "CONNECT"],
            "PUT",
            10,
        ),
        open(
            "se-broken-release",
            QuestionKind::Scenario,
            "A release breaks checkout for a subset of users. What do you do first?",
            "rollback, roll back, revert, feature flag",
            15,
        ),
        choice(
            "se-sql-join",
            QuestionKind::Technical,
            "What does a SQL JOIN clause do?",
            &[
                "Sorts the rows of a single table",
                "Combines rows from two or more tables",
                "Deletes duplicate rows",
                "Creates an index",
            ],
            "Combines rows from two or more tables",
            10,
        ),
    ]
}

fn data_scientist() -> Vec<QuestionDefinition> {
    vec![
        choice(
            "ds-overfitting",
            QuestionKind::Technical,
            "Which technique helps reduce overfitting?",
            &[
                "Adding features without validation",
                "Regularization",
                "Training for more epochs",
                "Removing the validation set",
            ],
            "Regularization",
            15,
        ),
        open(
            "ds-p-value",
            QuestionKind::Technical,
            "What does a p-value tell you about an experiment?",
            "probability, null hypothesis, observed",
            15,
        ),
        open(
            "ds-imbalanced-accuracy",
            QuestionKind::Scenario,
            "A fraud classifier scores 98% accuracy where 2% of samples are fraud. What do you check?",
            "precision, recall, f1, class imbalance, confusion matrix, resampling",
            20,
        ),
        choice(
            "ds-regression-metric",
            QuestionKind::Technical,
            "Which metric fits a regression model?",
            &["Accuracy", "F1 score", "Root mean squared error", "ROC AUC"],
            "Root mean squared error",
            15,
        ),
        open(
            "ds-stakeholder",
            QuestionKind::Behavioral,
            "Describe explaining a model result to a non-technical stakeholder.",
            "visualization, plain language, business impact, analogy",
            20,
        ),
        open(
            "ds-offline-online-gap",
            QuestionKind::Scenario,
            "Validation scores are far above production performance. What might be wrong?",
            "leakage, distribution shift, drift",
            15,
        ),
    ]
}

fn frontend_developer() -> Vec<QuestionDefinition> {
    vec![
        choice(
            "fe-box-sizing",
            QuestionKind::Technical,
            "Which declaration includes padding and border in an element's width?",
            &[
                "box-sizing: border-box",
                "display: block",
                "position: relative",
                "overflow: hidden",
            ],
            "box-sizing: border-box",
            15,
        ),
        open(
            "fe-event-loop",
            QuestionKind::Technical,
            "Explain how the browser event loop schedules asynchronous callbacks.",
            "call stack, task queue, microtask, callback queue",
            15,
        ),
        open(
            "fe-slow-page",
            QuestionKind::Scenario,
            "A page takes eight seconds to become interactive. How do you improve it?",
            "lazy loading, code splitting, bundle size, caching, lighthouse",
            20,
        ),
        choice(
            "fe-accessible-name",
            QuestionKind::Technical,
            "Which attribute gives an icon-only button an accessible name?",
            &["title", "aria-label", "data-name", "role"],
            "aria-label",
            15,
        ),
        open(
            "fe-designer-disagreement",
            QuestionKind::Behavioral,
            "Tell us about disagreeing with a designer on an implementation detail.",
            "discussed, compromise, prototype, user research, feedback",
            20,
        ),
        open(
            "fe-shared-state",
            QuestionKind::Scenario,
            "Several components show the same server data and drift out of sync. What do you do?",
            "single source of truth, state management, context, store, cache",
            15,
        ),
    ]
}

fn product_manager() -> Vec<QuestionDefinition> {
    vec![
        choice(
            "pm-rice",
            QuestionKind::Technical,
            "Which framework scores features by reach, impact, confidence and effort?",
            &["MoSCoW", "RICE", "Kano", "SWOT"],
            "RICE",
            20,
        ),
        open(
            "pm-engagement-drop",
            QuestionKind::Scenario,
            "Weekly active users dropped 15% after a release. How do you respond?",
            "funnel, cohort, rollback, analytics, user interviews",
            20,
        ),
        open(
            "pm-saying-no",
            QuestionKind::Behavioral,
            "Describe declining a senior stakeholder's feature request.",
            "data, trade-off, tradeoff, roadmap, alignment",
            20,
        ),
        choice(
            "pm-mvp",
            QuestionKind::Technical,
            "What is the primary goal of a minimum viable product?",
            &[
                "Ship every planned feature",
                "Validate assumptions with the least effort",
                "Replace user research",
                "Maximise initial revenue",
            ],
            "Validate assumptions with the least effort",
            20,
        ),
        open(
            "pm-slipped-dependency",
            QuestionKind::Scenario,
            "A launch is at risk because a dependency slipped. What do you do?",
            "scope, communicate, stakeholders, timeline, descope",
            20,
        ),
    ]
}
