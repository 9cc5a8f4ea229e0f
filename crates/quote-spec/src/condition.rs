use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::answers::{AnswerSet, AnswerValue};

/// Boolean connective shared by single conditions and condition groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicOperator {
    And,
    #[default]
    Or,
}

impl LogicOperator {
    /// Folds clause results. Callers handle the empty case themselves.
    pub fn combine(self, mut results: impl Iterator<Item = bool>) -> bool {
        match self {
            LogicOperator::And => results.all(|result| result),
            LogicOperator::Or => results.any(|result| result),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicOperator::And => "AND",
            LogicOperator::Or => "OR",
        }
    }
}

// Authoring tools emit "AND"/"OR" in whatever case; anything that is not an
// AND reads as OR, including null and non-string values.
impl<'de> Deserialize<'de> for LogicOperator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(label) if label.trim().eq_ignore_ascii_case("and") => {
                Ok(LogicOperator::And)
            }
            _ => Ok(LogicOperator::Or),
        }
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn lenient_question_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

// A bare string is a one-value list; anything unreadable is no values.
fn lenient_match_values<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

/// A rule over a single earlier answer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SingleCondition {
    #[serde(
        default,
        alias = "depends_on_question_id",
        deserialize_with = "lenient_question_id"
    )]
    pub depends_on_question_id: String,
    #[serde(
        default,
        alias = "match_values",
        deserialize_with = "lenient_match_values"
    )]
    pub match_values: Vec<String>,
    #[serde(default)]
    pub operator: LogicOperator,
}

impl SingleCondition {
    pub fn new<I, S>(
        depends_on: impl Into<String>,
        match_values: I,
        operator: LogicOperator,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            depends_on_question_id: depends_on.into(),
            match_values: match_values.into_iter().map(Into::into).collect(),
            operator,
        }
    }

    /// Evaluates the rule against the current answers.
    ///
    /// An unanswered dependency never satisfies a condition. For multi-select
    /// answers, `AND` means every match value was selected; for a scalar
    /// answer, `AND` requires every match value to equal the answer.
    pub fn is_satisfied(&self, answers: &AnswerSet) -> bool {
        let Some(answer) = answers.answered(&self.depends_on_question_id) else {
            return false;
        };
        let is_match = |value: &String| self.match_values.contains(value);
        match (answer, self.operator) {
            (AnswerValue::Multiple(selected), LogicOperator::Or) => selected.iter().any(is_match),
            (AnswerValue::Multiple(selected), LogicOperator::And) => self
                .match_values
                .iter()
                .all(|required| selected.contains(required)),
            (AnswerValue::Single(value), LogicOperator::Or) => is_match(value),
            (AnswerValue::Single(value), LogicOperator::And) => self
                .match_values
                .iter()
                .all(|required| required == value),
        }
    }
}

/// Several single conditions joined by one operator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionGroup {
    pub conditions: Vec<SingleCondition>,
    #[serde(default, alias = "group_operator")]
    pub group_operator: LogicOperator,
}

/// Visibility guard attached to a question.
///
/// Both serialized shapes are accepted: an object carrying a `conditions`
/// array parses as a group, any other object as a single condition. A value
/// that is not an object is kept as `Unrecognized` and never satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Condition {
    Group(ConditionGroup),
    Single(SingleCondition),
    Unrecognized(Value),
}

impl Condition {
    pub fn single<I, S>(
        depends_on: impl Into<String>,
        match_values: I,
        operator: LogicOperator,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::Single(SingleCondition::new(depends_on, match_values, operator))
    }

    pub fn group(conditions: Vec<SingleCondition>, group_operator: LogicOperator) -> Self {
        Condition::Group(ConditionGroup {
            conditions,
            group_operator,
        })
    }

    /// Normalized view: the clause list and the operator that joins it.
    pub fn clauses(&self) -> (&[SingleCondition], LogicOperator) {
        match self {
            Condition::Single(single) => (std::slice::from_ref(single), LogicOperator::Or),
            Condition::Group(group) => (&group.conditions, group.group_operator),
            Condition::Unrecognized(_) => (&[], LogicOperator::Or),
        }
    }

    /// Evaluates the condition. An empty clause list counts as no condition;
    /// an unrecognized condition is never satisfied.
    pub fn evaluate(&self, answers: &AnswerSet) -> bool {
        if let Condition::Unrecognized(raw) = self {
            trace!(condition = %raw, "unrecognized condition hides question");
            return false;
        }
        let (clauses, operator) = self.clauses();
        if clauses.is_empty() {
            return true;
        }
        operator.combine(clauses.iter().map(|clause| clause.is_satisfied(answers)))
    }
}
