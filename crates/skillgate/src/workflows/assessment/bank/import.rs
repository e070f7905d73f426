use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::super::domain::{QuestionDefinition, QuestionKind};
use super::{normalize_role, BankDefinition, BankError};

#[derive(Debug, Deserialize)]
struct BankRow {
    role: String,
    id: String,
    #[serde(rename = "type")]
    kind: String,
    prompt: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    options: Option<String>,
    reference_answer: String,
    points: u32,
}

/// Groups table rows into banks, keeping first-seen role order and row order within a role.
pub(super) fn parse_definitions<R: Read>(reader: R) -> Result<Vec<BankDefinition>, BankError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut banks: Vec<BankDefinition> = Vec::new();

    for row in csv_reader.deserialize::<BankRow>() {
        let row = row?;
        let role = normalize_role(&row.role);
        let kind = row
            .kind
            .parse::<QuestionKind>()
            .map_err(|value| BankError::UnknownQuestionType {
                role: role.clone(),
                id: row.id.clone(),
                value,
            })?;

        let question = QuestionDefinition {
            id: row.id,
            prompt: row.prompt,
            kind,
            options: row.options.as_deref().and_then(split_options),
            reference_answer: row.reference_answer,
            points: row.points,
        };

        match banks.iter_mut().find(|bank| bank.role == role) {
            Some(bank) => bank.questions.push(question),
            None => banks.push(BankDefinition {
                role,
                questions: vec![question],
            }),
        }
    }

    Ok(banks)
}

fn split_options(raw: &str) -> Option<Vec<String>> {
    let options: Vec<String> = raw
        .split('|')
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .map(str::to_string)
        .collect();

    if options.is_empty() {
        None
    } else {
        Some(options)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
