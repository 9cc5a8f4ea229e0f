use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::answers::{AnswerSet, AnswerValue};
use crate::details::{Address, ContactDetails};
use crate::spec::{form::FormSpec, question::Question};
use crate::visibility::resolve_visibility;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ()\-]+$").expect("phone pattern compiles"));

const MIN_PHONE_DIGITS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub missing_required: Vec<String>,
    pub unknown_fields: Vec<String>,
}

/// Checks answers against the form. Hidden questions are skipped, so stale
/// answers left behind by an earlier branch are never errors.
pub fn validate_answers(spec: &FormSpec, answers: &AnswerSet) -> ValidationResult {
    let visibility = resolve_visibility(spec, answers);

    let mut errors = Vec::new();
    let mut missing_required = Vec::new();

    for question in &spec.questions {
        if !visibility.get(&question.id).copied().unwrap_or(true) {
            continue;
        }

        match answers.get(&question.id) {
            Some(value) if !value.is_empty() => {
                if let Some(error) = validate_value(question, value) {
                    errors.push(error);
                }
            }
            _ => {
                if question.is_required {
                    missing_required.push(question.id.clone());
                }
            }
        }
    }

    let all_ids: BTreeSet<&str> = spec
        .questions
        .iter()
        .map(|question| question.id.as_str())
        .collect();
    let unknown_fields: Vec<String> = answers
        .iter()
        .map(|(id, _)| id)
        .filter(|id| !all_ids.contains(id))
        .map(str::to_string)
        .collect();

    ValidationResult {
        valid: errors.is_empty() && missing_required.is_empty() && unknown_fields.is_empty(),
        errors,
        missing_required,
        unknown_fields,
    }
}

fn validate_value(question: &Question, value: &AnswerValue) -> Option<ValidationError> {
    match value {
        AnswerValue::Multiple(_) if !question.allow_multiple => {
            return Some(question_error(
                question,
                "question accepts a single answer",
                "unexpected_list",
            ));
        }
        AnswerValue::Single(_) if question.allow_multiple => {
            return Some(question_error(
                question,
                "question expects a list of selections",
                "expected_list",
            ));
        }
        _ => {}
    }

    if let Some(invalid) = value
        .values()
        .into_iter()
        .find(|label| !question.accepts_option(label))
    {
        return Some(question_error(
            question,
            &format!("'{}' is not one of the answer options", invalid),
            "invalid_option",
        ));
    }

    None
}

fn question_error(question: &Question, message: &str, code: &str) -> ValidationError {
    ValidationError {
        question_id: Some(question.id.clone()),
        path: Some(format!("/{}", question.id)),
        message: message.into(),
        code: Some(code.into()),
    }
}

fn field_error(path: &str, message: &str, code: &str) -> ValidationError {
    ValidationError {
        question_id: None,
        path: Some(path.into()),
        message: message.into(),
        code: Some(code.into()),
    }
}

pub fn validate_address(address: &Address) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if address.line1.trim().is_empty() {
        errors.push(field_error(
            "/address/line1",
            "address line 1 is required",
            "required",
        ));
    }
    if address.postcode.trim().is_empty() {
        errors.push(field_error(
            "/address/postcode",
            "postcode is required",
            "required",
        ));
    }
    errors
}

pub fn validate_contact(contact: &ContactDetails) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if contact.full_name.trim().is_empty() {
        errors.push(field_error(
            "/contact/fullName",
            "full name is required",
            "required",
        ));
    }

    let email = contact.email.trim();
    if email.is_empty() {
        errors.push(field_error("/contact/email", "email is required", "required"));
    } else if !EMAIL_PATTERN.is_match(email) {
        errors.push(field_error(
            "/contact/email",
            "email address is not valid",
            "invalid_email",
        ));
    }

    let phone = contact.phone.trim();
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if phone.is_empty() {
        errors.push(field_error("/contact/phone", "phone is required", "required"));
    } else if !PHONE_PATTERN.is_match(phone) || digits < MIN_PHONE_DIGITS {
        errors.push(field_error(
            "/contact/phone",
            "phone number is not valid",
            "invalid_phone",
        ));
    }

    errors
}
