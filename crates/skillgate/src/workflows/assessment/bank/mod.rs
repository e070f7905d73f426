mod import;
mod standard;

use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{budget_for, GradingRule, Question, QuestionDefinition};

pub use standard::DEFAULT_ROLE;

/// Load-time configuration errors for question banks.
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("no question banks were supplied")]
    NoBanks,
    #[error("default bank '{role}' is not present")]
    MissingDefault { role: String },
    #[error("bank '{role}' is defined more than once")]
    DuplicateBank { role: String },
    #[error("bank '{role}' has no questions")]
    EmptyBank { role: String },
    #[error("bank '{role}' repeats question id '{id}'")]
    DuplicateQuestion { role: String, id: String },
    #[error("question '{id}' in bank '{role}' must carry positive points")]
    NonPositivePoints { role: String, id: String },
    #[error("question '{id}' in bank '{role}' has a reference answer that is not one of its options")]
    AnswerNotAnOption { role: String, id: String },
    #[error("question '{id}' in bank '{role}' has no usable keywords")]
    NoKeywords { role: String, id: String },
    #[error("question '{id}' in bank '{role}' has unknown type '{value}'")]
    UnknownQuestionType {
        role: String,
        id: String,
        value: String,
    },
    #[error("failed to read question bank table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid question bank CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Authored bank: a role key and its ordered questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDefinition {
    pub role: String,
    pub questions: Vec<QuestionDefinition>,
}

/// Outcome of resolving a role against the repository.
#[derive(Debug, Clone)]
pub struct BankSelection {
    pub requested_role: String,
    pub role: String,
    pub fallback: bool,
    pub questions: Arc<[Question]>,
}

/// Summary row describing one bundled bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleSummary {
    pub role: String,
    pub question_count: usize,
    pub max_score: u32,
    pub budget_seconds: u32,
    pub is_default: bool,
}

/// Immutable role → question bank table with a designated fallback bank.
#[derive(Debug, Clone)]
pub struct QuestionBankRepository {
    banks: BTreeMap<String, Arc<[Question]>>,
    default_role: String,
}

/// Lower-cases and trims a role identifier before lookup.
pub fn normalize_role(role: &str) -> String {
    role.trim().to_lowercase()
}

impl QuestionBankRepository {
    /// Banks bundled with the engine.
    pub fn standard() -> Result<Self, BankError> {
        Self::new(standard::bank_definitions(), DEFAULT_ROLE)
    }

    pub fn new(definitions: Vec<BankDefinition>, default_role: &str) -> Result<Self, BankError> {
        if definitions.is_empty() {
            return Err(BankError::NoBanks);
        }

        let banks = resolve_banks(definitions)?;

        let default_role = normalize_role(default_role);
        if !banks.contains_key(&default_role) {
            return Err(BankError::MissingDefault { role: default_role });
        }

        info!(banks = banks.len(), default = %default_role, "question banks loaded");
        Ok(Self {
            banks,
            default_role,
        })
    }

    /// Replaces or adds banks from `definitions`, keeping the existing default.
    /// A role may appear only once within `definitions`.
    pub fn with_overrides(mut self, definitions: Vec<BankDefinition>) -> Result<Self, BankError> {
        for (role, questions) in resolve_banks(definitions)? {
            info!(role = %role, questions = questions.len(), "question bank override applied");
            self.banks.insert(role, questions);
        }
        Ok(self)
    }

    /// Parses a bank table CSV (`role,id,type,prompt,options,reference_answer,points`).
    pub fn definitions_from_csv_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<BankDefinition>, BankError> {
        import::parse_definitions(reader)
    }

    pub fn definitions_from_csv_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<BankDefinition>, BankError> {
        let file = std::fs::File::open(path)?;
        Self::definitions_from_csv_reader(file)
    }

    /// Resolves `role` to its bank, falling back to the default bank when absent.
    pub fn lookup(&self, role: &str) -> BankSelection {
        let normalized = normalize_role(role);

        if let Some(questions) = self.banks.get(&normalized) {
            return BankSelection {
                requested_role: role.to_string(),
                role: normalized,
                fallback: false,
                questions: Arc::clone(questions),
            };
        }

        debug!(requested = %role, fallback = %self.default_role, "no bank for role, using default");
        let questions = self
            .banks
            .get(&self.default_role)
            .map(Arc::clone)
            .unwrap_or_else(|| Arc::from(Vec::new()));

        BankSelection {
            requested_role: role.to_string(),
            role: self.default_role.clone(),
            fallback: true,
            questions,
        }
    }

    pub fn contains(&self, role: &str) -> bool {
        self.banks.contains_key(&normalize_role(role))
    }

    pub fn summaries(&self) -> Vec<RoleSummary> {
        self.banks
            .iter()
            .map(|(role, questions)| RoleSummary {
                role: role.clone(),
                question_count: questions.len(),
                max_score: questions.iter().map(|question| question.points).sum(),
                budget_seconds: budget_for(questions.len()),
                is_default: *role == self.default_role,
            })
            .collect()
    }
}

fn resolve_banks(
    definitions: Vec<BankDefinition>,
) -> Result<BTreeMap<String, Arc<[Question]>>, BankError> {
    let mut banks = BTreeMap::new();
    for definition in definitions {
        let (role, questions) = resolve_bank(definition)?;
        if banks.contains_key(&role) {
            return Err(BankError::DuplicateBank { role });
        }
        banks.insert(role, questions);
    }
    Ok(banks)
}

fn resolve_bank(definition: BankDefinition) -> Result<(String, Arc<[Question]>), BankError> {
    let role = normalize_role(&definition.role);
    if definition.questions.is_empty() {
        return Err(BankError::EmptyBank { role });
    }

    let mut seen = HashSet::new();
    let mut questions = Vec::with_capacity(definition.questions.len());
    for question in definition.questions {
        if !seen.insert(question.id.clone()) {
            return Err(BankError::DuplicateQuestion {
                role,
                id: question.id,
            });
        }
        questions.push(resolve_question(&role, question)?);
    }

    Ok((role, Arc::from(questions)))
}

fn resolve_question(role: &str, definition: QuestionDefinition) -> Result<Question, BankError> {
    let QuestionDefinition {
        id,
        prompt,
        kind,
        options,
        reference_answer,
        points,
    } = definition;

    if points == 0 {
        return Err(BankError::NonPositivePoints {
            role: role.to_string(),
            id,
        });
    }

    let rule = match options {
        Some(options) => {
            let reference = reference_answer.to_lowercase();
            if !options
                .iter()
                .any(|option| option.to_lowercase() == reference)
            {
                return Err(BankError::AnswerNotAnOption {
                    role: role.to_string(),
                    id,
                });
            }
            GradingRule::ExactMatch {
                options,
                answer: reference_answer,
            }
        }
        None => {
            let keywords = GradingRule::keywords_from_reference(&reference_answer);
            if keywords.is_empty() {
                return Err(BankError::NoKeywords {
                    role: role.to_string(),
                    id,
                });
            }
            GradingRule::KeywordMatch { keywords }
        }
    };

    Ok(Question {
        id,
        prompt,
        kind,
        rule,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::assessment::domain::QuestionKind;

    fn definition(id: &str, options: Option<Vec<&str>>, reference: &str) -> QuestionDefinition {
        QuestionDefinition {
            id: id.to_string(),
            prompt: format!("prompt for {id}"),
            kind: QuestionKind::Technical,
            options: options.map(|values| values.into_iter().map(str::to_string).collect()),
            reference_answer: reference.to_string(),
            points: 10,
        }
    }

    fn bank(role: &str, questions: Vec<QuestionDefinition>) -> BankDefinition {
        BankDefinition {
            role: role.to_string(),
            questions,
        }
    }

    #[test]
    fn standard_banks_are_valid_and_total_one_hundred() {
        let repository = QuestionBankRepository::standard().expect("bundled banks are valid");
        let summaries = repository.summaries();

        assert!(summaries.len() >= 4);
        for summary in &summaries {
            assert_eq!(summary.max_score, 100, "bank {} must total 100", summary.role);
        }
        assert!(summaries
            .iter()
            .any(|summary| summary.is_default && summary.role == DEFAULT_ROLE));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let repository = QuestionBankRepository::standard().expect("bundled banks are valid");
        let selection = repository.lookup("  Data Scientist ");

        assert_eq!(selection.role, "data scientist");
        assert!(!selection.fallback);
        assert_eq!(selection.requested_role, "  Data Scientist ");
    }

    #[test]
    fn unknown_role_falls_back_to_default_bank() {
        let repository = QuestionBankRepository::standard().expect("bundled banks are valid");
        let selection = repository.lookup("astronaut");

        assert!(selection.fallback);
        assert_eq!(selection.role, DEFAULT_ROLE);
        assert_eq!(selection.questions.len(), 8);
    }

    #[test]
    fn rejects_empty_banks() {
        match QuestionBankRepository::new(vec![bank("qa engineer", Vec::new())], "qa engineer") {
            Err(BankError::EmptyBank { role }) => assert_eq!(role, "qa engineer"),
            other => panic!("expected empty bank error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_roles_that_normalize_to_the_same_bank() {
        let banks = vec![
            bank("QA Engineer", vec![definition("q1", None, "tests")]),
            bank("  qa engineer ", vec![definition("q2", None, "coverage")]),
        ];
        match QuestionBankRepository::new(banks, "qa engineer") {
            Err(BankError::DuplicateBank { role }) => assert_eq!(role, "qa engineer"),
            other => panic!("expected duplicate bank error, got {other:?}"),
        }
    }

    #[test]
    fn overrides_reject_repeated_roles_within_one_table() {
        let outcome = QuestionBankRepository::standard()
            .expect("bundled banks are valid")
            .with_overrides(vec![
                bank("Data Scientist", vec![definition("a", None, "pandas")]),
                bank("data scientist", vec![definition("b", None, "numpy")]),
            ]);
        assert!(matches!(outcome, Err(BankError::DuplicateBank { .. })));
    }

    #[test]
    fn rejects_missing_default_bank() {
        let banks = vec![bank("qa engineer", vec![definition("q1", None, "tests")])];
        match QuestionBankRepository::new(banks, "designer") {
            Err(BankError::MissingDefault { role }) => assert_eq!(role, "designer"),
            other => panic!("expected missing default error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_ids_and_zero_points() {
        let duplicated = vec![bank(
            "qa engineer",
            vec![
                definition("q1", None, "tests"),
                definition("q1", None, "coverage"),
            ],
        )];
        assert!(matches!(
            QuestionBankRepository::new(duplicated, "qa engineer"),
            Err(BankError::DuplicateQuestion { .. })
        ));

        let mut zero = definition("q1", None, "tests");
        zero.points = 0;
        assert!(matches!(
            QuestionBankRepository::new(vec![bank("qa engineer", vec![zero])], "qa engineer"),
            Err(BankError::NonPositivePoints { .. })
        ));
    }

    #[test]
    fn rejects_reference_answers_outside_the_options() {
        let banks = vec![bank(
            "qa engineer",
            vec![definition("q1", Some(vec!["Unit", "Integration"]), "Fuzz")],
        )];
        assert!(matches!(
            QuestionBankRepository::new(banks, "qa engineer"),
            Err(BankError::AnswerNotAnOption { .. })
        ));
    }

    #[test]
    fn rejects_keyword_rules_without_keywords() {
        let banks = vec![bank("qa engineer", vec![definition("q1", None, " , ,")])];
        assert!(matches!(
            QuestionBankRepository::new(banks, "qa engineer"),
            Err(BankError::NoKeywords { .. })
        ));
    }

    #[test]
    fn grading_rule_is_resolved_from_options_presence() {
        let banks = vec![bank(
            "qa engineer",
            vec![
                definition("mc", Some(vec!["Unit", "Integration"]), "Unit"),
                definition("kw", None, "Mocks, Stubs"),
            ],
        )];
        let repository =
            QuestionBankRepository::new(banks, "QA Engineer").expect("bank is valid");
        let selection = repository.lookup("qa engineer");

        assert!(matches!(
            selection.questions[0].rule,
            GradingRule::ExactMatch { .. }
        ));
        assert_eq!(
            selection.questions[1].rule,
            GradingRule::KeywordMatch {
                keywords: vec!["mocks".to_string(), "stubs".to_string()]
            }
        );
    }

    #[test]
    fn overrides_replace_bundled_banks() {
        let repository = QuestionBankRepository::standard()
            .expect("bundled banks are valid")
            .with_overrides(vec![bank(
                "Software Engineer",
                vec![definition("only", None, "ownership")],
            )])
            .expect("override is valid");

        let selection = repository.lookup("software engineer");
        assert_eq!(selection.questions.len(), 1);
        assert_eq!(selection.questions[0].id, "only");
    }
}
