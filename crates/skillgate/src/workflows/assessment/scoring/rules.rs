use super::super::domain::GradingRule;

/// Judges a single submitted answer against its grading rule.
pub(crate) fn is_correct(rule: &GradingRule, submitted: &str) -> bool {
    let submitted = submitted.to_lowercase();

    match rule {
        GradingRule::ExactMatch { answer, .. } => submitted == answer.to_lowercase(),
        GradingRule::KeywordMatch { keywords } => {
            if submitted.trim().is_empty() {
                return false;
            }
            keywords
                .iter()
                .any(|keyword| submitted.contains(keyword.as_str()))
        }
    }
}

/// `round(100 * score / max_score)` with halves rounded up.
pub(crate) fn percentage(score: u32, max_score: u32) -> u32 {
    if max_score == 0 {
        return 0;
    }
    let score = u64::from(score);
    let max_score = u64::from(max_score);
    ((200 * score + max_score) / (2 * max_score)) as u32
}
