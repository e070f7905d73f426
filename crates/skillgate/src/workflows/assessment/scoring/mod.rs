mod rules;

use super::answers::AnswerStore;
use super::domain::{budget_for, Question, QuestionKind, PASS_THRESHOLD_PERCENT};
use serde::{Deserialize, Serialize};

/// Grading outcome for one question, kept for audit alongside the totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedAnswer {
    pub question_id: String,
    pub kind: QuestionKind,
    pub correct: bool,
    pub points_awarded: u32,
}

/// Derived scoring outcome of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub passed: bool,
    pub correct_count: usize,
    pub total_count: usize,
    pub time_taken_seconds: u32,
    pub weak_areas: Vec<QuestionKind>,
    pub graded: Vec<GradedAnswer>,
}

impl AssessmentResult {
    pub fn summary(&self) -> String {
        let verdict = if self.passed { "passed" } else { "not passed" };
        format!(
            "{verdict}: {}/{} ({}%), {} of {} correct",
            self.score, self.max_score, self.percentage, self.correct_count, self.total_count
        )
    }
}

/// Scores `answers` against `questions` with `time_left_seconds` remaining on the clock.
///
/// Pure and deterministic: identical inputs always produce identical results.
pub fn score(
    questions: &[Question],
    answers: &AnswerStore,
    time_left_seconds: u32,
) -> AssessmentResult {
    let max_score: u32 = questions.iter().map(|question| question.points).sum();
    let budget = budget_for(questions.len());

    let mut score = 0;
    let mut correct_count = 0;
    let mut weak_areas: Vec<QuestionKind> = Vec::new();
    let mut graded = Vec::with_capacity(questions.len());

    for question in questions {
        let correct = rules::is_correct(&question.rule, answers.text_for(&question.id));

        if correct {
            score += question.points;
            correct_count += 1;
        } else if !weak_areas.contains(&question.kind) {
            weak_areas.push(question.kind);
        }

        graded.push(GradedAnswer {
            question_id: question.id.clone(),
            kind: question.kind,
            correct,
            points_awarded: if correct { question.points } else { 0 },
        });
    }

    let percentage = rules::percentage(score, max_score);

    AssessmentResult {
        score,
        max_score,
        percentage,
        passed: percentage >= PASS_THRESHOLD_PERCENT,
        correct_count,
        total_count: questions.len(),
        time_taken_seconds: budget.saturating_sub(time_left_seconds),
        weak_areas,
        graded,
    }
}
