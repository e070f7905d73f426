use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seconds of budget granted per question in a bank.
pub const SECONDS_PER_QUESTION: u32 = 90;

/// Minimum percentage required to pass an assessment.
pub const PASS_THRESHOLD_PERCENT: u32 = 70;

/// Total time allotted to a session with `question_count` questions.
pub const fn budget_for(question_count: usize) -> u32 {
    question_count as u32 * SECONDS_PER_QUESTION
}

/// Identifier wrapper for assessment sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Question category, surfaced as a weak area when answered incorrectly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Technical,
    Behavioral,
    Scenario,
}

impl QuestionKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Technical => "Technical",
            Self::Behavioral => "Behavioral",
            Self::Scenario => "Scenario",
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "technical" => Ok(Self::Technical),
            "behavioral" | "behavioural" => Ok(Self::Behavioral),
            "scenario" => Ok(Self::Scenario),
            other => Err(other.to_string()),
        }
    }
}

/// Authored form of a question, as bundled or imported.
///
/// `reference_answer` carries the correct option when `options` is present, otherwise a
/// comma-separated keyword list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    pub id: String,
    pub prompt: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub reference_answer: String,
    pub points: u32,
}

/// How a submitted answer is judged, resolved once when the bank is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum GradingRule {
    /// Multiple choice: the answer must equal `answer` ignoring case.
    ExactMatch { options: Vec<String>, answer: String },
    /// Free form: any keyword appearing in the answer satisfies the question.
    KeywordMatch { keywords: Vec<String> },
}

impl GradingRule {
    /// Splits a comma-separated reference into trimmed, lower-cased, non-empty keywords.
    pub fn keywords_from_reference(reference: &str) -> Vec<String> {
        reference
            .split(',')
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub kind: QuestionKind,
    pub rule: GradingRule,
    pub points: u32,
}

impl Question {
    pub fn options(&self) -> Option<&[String]> {
        match &self.rule {
            GradingRule::ExactMatch { options, .. } => Some(options),
            GradingRule::KeywordMatch { .. } => None,
        }
    }
}

/// Lifecycle of a single assessment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Loading,
    Briefed,
    Active,
    Completed,
}

impl SessionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Briefed => "briefed",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Path that moved a session out of `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionCause {
    Submitted,
    TimeExpired,
}

impl CompletionCause {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::TimeExpired => "time expired",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_trimmed_lowercased_and_non_empty() {
        let keywords = GradingRule::keywords_from_reference(" Logs, METRICS ,, tracing ,");
        assert_eq!(keywords, vec!["logs", "metrics", "tracing"]);
    }

    #[test]
    fn question_kind_parses_case_insensitively() {
        assert_eq!("Technical".parse(), Ok(QuestionKind::Technical));
        assert_eq!(" behavioural ".parse(), Ok(QuestionKind::Behavioral));
        assert_eq!(
            "trivia".parse::<QuestionKind>(),
            Err("trivia".to_string())
        );
    }

    #[test]
    fn budget_scales_with_question_count() {
        assert_eq!(budget_for(8), 720);
        assert_eq!(budget_for(1), SECONDS_PER_QUESTION);
    }
}
