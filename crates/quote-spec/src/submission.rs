use serde::{Deserialize, Serialize};

use crate::answers::{AnswerSet, AnswerValue};
use crate::details::{Address, ContactDetails};
use crate::spec::form::FormSpec;
use crate::visibility::compute_visible_questions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub question: String,
    pub step_number: u32,
    pub value: AnswerValue,
}

/// Payload handed to the quote intake once the wizard completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSubmission {
    pub form_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub answers: Vec<SubmittedAnswer>,
    pub address: Address,
    pub contact: ContactDetails,
}

/// Collects the answers of visible questions in question order. Answers
/// to questions hidden by a later change are left out.
pub fn build_submission(
    spec: &FormSpec,
    answers: &AnswerSet,
    address: &Address,
    contact: &ContactDetails,
) -> QuoteSubmission {
    let answers_out = compute_visible_questions(&spec.questions, answers)
        .into_iter()
        .filter_map(|question| {
            let value = answers.get(&question.id).filter(|value| !value.is_empty())?;
            Some(SubmittedAnswer {
                question_id: question.id.clone(),
                question: question.title().to_string(),
                step_number: question.step_number,
                value: value.clone(),
            })
        })
        .collect();

    QuoteSubmission {
        form_id: spec.id.clone(),
        category: spec.category.clone(),
        answers: answers_out,
        address: address.clone(),
        contact: contact.clone(),
    }
}
