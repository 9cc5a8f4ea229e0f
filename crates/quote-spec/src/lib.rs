#![allow(missing_docs)]

pub mod answers;
pub mod condition;
pub mod config;
pub mod details;
pub mod lint;
pub mod render;
pub mod session;
pub mod spec;
pub mod submission;
pub mod validate;
pub mod visibility;

pub use answers::{AnswerSet, AnswerValue};
pub use condition::{Condition, ConditionGroup, LogicOperator, SingleCondition};
pub use config::WizardConfig;
pub use details::{Address, ContactDetails};
pub use lint::{LintIssue, LintReport, LintSeverity, lint_form};
pub use render::{
    RenderPayload, RenderProgress, RenderQuestion, RenderStatus, RenderView, build_render_payload,
    render_json_ui, render_text,
};
pub use session::{AnswerOutcome, SessionError, StepView, TRAILING_STEPS, WizardSession};
pub use spec::{AnswerOption, FormSpec, Question, form::form_schema};
pub use submission::{QuoteSubmission, SubmittedAnswer, build_submission};
pub use validate::{
    ValidationError, ValidationResult, validate_address, validate_answers, validate_contact,
};
pub use visibility::{
    VisibilityMap, compute_visible_questions, first_question_for_step, is_visible,
    questions_for_step, resolve_visibility, visible_step_numbers,
};
