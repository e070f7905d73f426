use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Submitted answers keyed by question id, independent of navigation position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerStore {
    entries: BTreeMap<String, String>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the answer for `question_id`. Blank text clears the entry.
    pub fn upsert(&mut self, question_id: impl Into<String>, text: impl Into<String>) {
        let question_id = question_id.into();
        let text = text.into();
        if text.trim().is_empty() {
            self.entries.remove(&question_id);
        } else {
            self.entries.insert(question_id, text);
        }
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.entries.get(question_id).map(String::as_str)
    }

    /// Answer text for scoring; a missing entry reads as empty.
    pub fn text_for(&self, question_id: &str) -> &str {
        self.get(question_id).unwrap_or("")
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.entries.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_existing_answer() {
        let mut store = AnswerStore::new();
        store.upsert("q1", "first");
        store.upsert("q1", "second");

        assert_eq!(store.get("q1"), Some("second"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn entries_are_independent_per_question() {
        let mut store = AnswerStore::new();
        store.upsert("q1", "alpha");
        store.upsert("q2", "beta");
        store.upsert("q1", "gamma");

        assert_eq!(store.get("q2"), Some("beta"));
        assert_eq!(store.get("q1"), Some("gamma"));
    }

    #[test]
    fn blank_answers_read_as_unanswered() {
        let mut store = AnswerStore::new();
        store.upsert("q1", "draft");
        store.upsert("q1", "   ");

        assert!(!store.is_answered("q1"));
        assert_eq!(store.text_for("q1"), "");
        assert_eq!(store.text_for("never-seen"), "");
        assert!(store.is_empty());
    }
}
