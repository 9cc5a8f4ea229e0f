use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, LogicOperator, SingleCondition};
use crate::spec::{form::FormSpec, question::Question};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LintSeverity {
    Warning,
    Error,
}

impl LintSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            LintSeverity::Warning => "warning",
            LintSeverity::Error => "error",
        }
    }
}

/// One finding about a form definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintIssue {
    pub severity: LintSeverity,
    pub question_id: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintReport {
    pub issues: Vec<LintIssue>,
}

impl LintReport {
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == LintSeverity::Error)
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn codes_for(&self, question_id: &str) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|issue| issue.question_id == question_id)
            .map(|issue| issue.code.as_str())
            .collect()
    }

    fn push(&mut self, severity: LintSeverity, question: &Question, code: &str, message: String) {
        self.issues.push(LintIssue {
            severity,
            question_id: question.id.clone(),
            code: code.into(),
            message,
        });
    }
}

/// Authoring-time checks over a form definition.
///
/// The visibility evaluator trusts its input: a condition pointing at an
/// unknown or later question just never matches. This is where such
/// definitions get reported.
pub fn lint_form(spec: &FormSpec) -> LintReport {
    let mut report = LintReport::default();
    let mut by_id: BTreeMap<&str, &Question> = BTreeMap::new();
    let mut seen = BTreeSet::new();

    for question in &spec.questions {
        if !seen.insert(question.id.as_str()) {
            report.push(
                LintSeverity::Error,
                question,
                "duplicate_id",
                format!("question id '{}' is used more than once", question.id),
            );
        }
        by_id.entry(question.id.as_str()).or_insert(question);

        if question.step_number == 0 {
            report.push(
                LintSeverity::Error,
                question,
                "invalid_step",
                "step numbers start at 1".into(),
            );
        }

        if question.is_multiple_choice && question.answer_options.is_empty() {
            report.push(
                LintSeverity::Warning,
                question,
                "missing_options",
                "multiple-choice question has no answer options".into(),
            );
        }
    }

    for question in &spec.questions {
        let Some(condition) = &question.condition else {
            continue;
        };
        if let Condition::Unrecognized(raw) = condition {
            report.push(
                LintSeverity::Error,
                question,
                "unrecognized_condition",
                format!("condition {} is not an object; question stays hidden", raw),
            );
            continue;
        }
        let (clauses, _) = condition.clauses();
        if clauses.is_empty() {
            report.push(
                LintSeverity::Warning,
                question,
                "empty_group",
                "condition group has no conditions; question is always visible".into(),
            );
        }
        for clause in clauses {
            lint_clause(&mut report, question, clause, &by_id);
        }
    }

    report
}

fn lint_clause(
    report: &mut LintReport,
    question: &Question,
    clause: &SingleCondition,
    by_id: &BTreeMap<&str, &Question>,
) {
    let Some(target) = by_id.get(clause.depends_on_question_id.as_str()) else {
        report.push(
            LintSeverity::Error,
            question,
            "dangling_reference",
            format!(
                "condition depends on unknown question '{}'",
                clause.depends_on_question_id
            ),
        );
        return;
    };

    if target.step_number >= question.step_number {
        report.push(
            LintSeverity::Error,
            question,
            "forward_reference",
            format!(
                "condition depends on '{}' (step {}), which is not before step {}",
                target.id, target.step_number, question.step_number
            ),
        );
    }

    if clause.match_values.is_empty() {
        report.push(
            LintSeverity::Warning,
            question,
            "empty_match_values",
            format!("condition on '{}' has no match values", target.id),
        );
    }

    let distinct_values: BTreeSet<&str> =
        clause.match_values.iter().map(String::as_str).collect();
    if clause.operator == LogicOperator::And
        && distinct_values.len() > 1
        && !target.allow_multiple
    {
        report.push(
            LintSeverity::Warning,
            question,
            "scalar_and_multi_value",
            format!(
                "AND over {} values against single-answer question '{}' can never match",
                distinct_values.len(),
                target.id
            ),
        );
    }

    if target.is_multiple_choice && !target.answer_options.is_empty() {
        for value in &clause.match_values {
            if !target.accepts_option(value) {
                report.push(
                    LintSeverity::Warning,
                    question,
                    "unknown_match_value",
                    format!("'{}' is not an answer option of '{}'", value, target.id),
                );
            }
        }
    }
}
