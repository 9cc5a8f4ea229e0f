use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::answers::AnswerSet;
use crate::spec::{form::FormSpec, question::Question};

/// Visibility flag for every question of a form, keyed by question id.
pub type VisibilityMap = BTreeMap<String, bool>;

/// Whether `question` should currently be shown. Questions without a
/// condition are always visible.
pub fn is_visible(question: &Question, answers: &AnswerSet) -> bool {
    match &question.condition {
        Some(condition) => condition.evaluate(answers),
        None => true,
    }
}

/// Filters `all_questions` down to the ones currently visible, keeping their
/// relative order.
///
/// Pure and cheap; hosts call it again after every answer change rather than
/// patching a previous result.
pub fn compute_visible_questions<'a>(
    all_questions: &'a [Question],
    answers: &AnswerSet,
) -> Vec<&'a Question> {
    all_questions
        .iter()
        .filter(|question| {
            let visible = is_visible(question, answers);
            trace!(question_id = %question.id, visible, "evaluated question visibility");
            visible
        })
        .collect()
}

pub fn resolve_visibility(spec: &FormSpec, answers: &AnswerSet) -> VisibilityMap {
    spec.questions
        .iter()
        .map(|question| (question.id.clone(), is_visible(question, answers)))
        .collect()
}

/// Distinct step numbers of the visible questions, ascending.
pub fn visible_step_numbers(visible: &[&Question]) -> Vec<u32> {
    visible
        .iter()
        .map(|question| question.step_number)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Every visible question on `step`, ordered by `display_order`.
pub fn questions_for_step<'a>(visible: &[&'a Question], step: u32) -> Vec<&'a Question> {
    let mut questions: Vec<&Question> = visible
        .iter()
        .copied()
        .filter(|question| question.step_number == step)
        .collect();
    questions.sort_by_key(|question| question.display_order);
    questions
}

/// The question a one-question-per-screen renderer shows for `step`.
pub fn first_question_for_step<'a>(visible: &[&'a Question], step: u32) -> Option<&'a Question> {
    questions_for_step(visible, step).into_iter().next()
}
