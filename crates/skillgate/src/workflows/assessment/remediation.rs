use serde::{Deserialize, Serialize};

use super::domain::QuestionKind;
use super::scoring::AssessmentResult;

/// Actions a result view may offer the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationAction {
    Proceed,
    ContinueWithoutChanges,
    Restart,
}

/// Branch selected by a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "branch", rename_all = "snake_case")]
pub enum RemediationBranch {
    Proceed,
    Remediate { weak_areas: Vec<QuestionKind> },
}

/// What the host should do after an action was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationDecision {
    /// Move on to the downstream opportunity flow.
    ProceedToOpportunities,
    /// Close the advisory and remain on the result view.
    StayOnResult,
    /// Reset the session into a fresh active attempt.
    RestartAssessment,
}

#[derive(Debug, thiserror::Error)]
pub enum RemediationError {
    #[error("action '{action:?}' is not offered for this result")]
    Unavailable { action: RemediationAction },
}

/// Interprets a result into the pass branch or the remediation advisory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationController {
    branch: RemediationBranch,
    advisory_open: bool,
}

impl RemediationController {
    pub fn from_result(result: &AssessmentResult) -> Self {
        if result.passed {
            Self {
                branch: RemediationBranch::Proceed,
                advisory_open: false,
            }
        } else {
            Self {
                branch: RemediationBranch::Remediate {
                    weak_areas: result.weak_areas.clone(),
                },
                advisory_open: true,
            }
        }
    }

    pub fn branch(&self) -> &RemediationBranch {
        &self.branch
    }

    pub fn passed(&self) -> bool {
        matches!(self.branch, RemediationBranch::Proceed)
    }

    pub fn weak_areas(&self) -> &[QuestionKind] {
        match &self.branch {
            RemediationBranch::Proceed => &[],
            RemediationBranch::Remediate { weak_areas } => weak_areas,
        }
    }

    /// Whether the remediation advisory is still shown.
    pub fn advisory_open(&self) -> bool {
        self.advisory_open
    }

    pub fn actions(&self) -> Vec<RemediationAction> {
        match self.branch {
            RemediationBranch::Proceed => vec![RemediationAction::Proceed],
            RemediationBranch::Remediate { .. } => vec![
                RemediationAction::ContinueWithoutChanges,
                RemediationAction::Restart,
            ],
        }
    }

    pub fn choose(
        &mut self,
        action: RemediationAction,
    ) -> Result<RemediationDecision, RemediationError> {
        if !self.actions().contains(&action) {
            return Err(RemediationError::Unavailable { action });
        }

        let decision = match action {
            RemediationAction::Proceed => RemediationDecision::ProceedToOpportunities,
            RemediationAction::ContinueWithoutChanges => {
                self.advisory_open = false;
                RemediationDecision::StayOnResult
            }
            RemediationAction::Restart => RemediationDecision::RestartAssessment,
        };

        Ok(decision)
    }
}
