use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A given answer: one value, or the selected values of a multi-select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Multiple(Vec<String>),
}

impl AnswerValue {
    /// An empty string counts as no answer at all. An empty selection does not.
    pub fn is_blank(&self) -> bool {
        matches!(self, AnswerValue::Single(value) if value.is_empty())
    }

    /// True when nothing was entered or selected.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Single(value) => value.is_empty(),
            AnswerValue::Multiple(values) => values.is_empty(),
        }
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            AnswerValue::Single(value) => Some(value),
            AnswerValue::Multiple(_) => None,
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            AnswerValue::Single(value) => vec![value.as_str()],
            AnswerValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    pub fn display(&self) -> String {
        self.values().join(", ")
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Single(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Single(value.to_string())
    }
}

impl<S: Into<String>> From<Vec<S>> for AnswerValue {
    fn from(values: Vec<S>) -> Self {
        AnswerValue::Multiple(values.into_iter().map(Into::into).collect())
    }
}

/// Live mapping of question id to answer for one wizard session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: BTreeMap<String, AnswerValue>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    /// The answer for `question_id`, unless it is missing or blank.
    pub fn answered(&self, question_id: &str) -> Option<&AnswerValue> {
        self.get(question_id).filter(|value| !value.is_blank())
    }

    /// Whether the question has a non-empty answer.
    pub fn is_answered(&self, question_id: &str) -> bool {
        self.get(question_id).is_some_and(|value| !value.is_empty())
    }

    pub fn insert(
        &mut self,
        question_id: impl Into<String>,
        value: impl Into<AnswerValue>,
    ) -> Option<AnswerValue> {
        self.answers.insert(question_id.into(), value.into())
    }

    pub fn remove(&mut self, question_id: &str) -> Option<AnswerValue> {
        self.answers.remove(question_id)
    }

    /// Adds `value` to a multi-select answer, or removes it when already
    /// selected. A scalar answer is promoted to a selection first.
    pub fn toggle(&mut self, question_id: &str, value: &str) {
        let entry = self
            .answers
            .entry(question_id.to_string())
            .or_insert_with(|| AnswerValue::Multiple(Vec::new()));
        if let AnswerValue::Single(existing) = entry {
            let promoted = if existing.is_empty() {
                Vec::new()
            } else {
                vec![std::mem::take(existing)]
            };
            *entry = AnswerValue::Multiple(promoted);
        }
        if let AnswerValue::Multiple(selected) = entry {
            if let Some(position) = selected.iter().position(|item| item == value) {
                selected.remove(position);
            } else {
                selected.push(value.to_string());
            }
        }
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.answers.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.answers.iter().map(|(id, value)| (id.as_str(), value))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, serde_cbor::Error> {
        serde_cbor::from_slice(bytes)
    }
}

impl<K, V> FromIterator<(K, V)> for AnswerSet
where
    K: Into<String>,
    V: Into<AnswerValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            answers: iter
                .into_iter()
                .map(|(id, value)| (id.into(), value.into()))
                .collect(),
        }
    }
}
