use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::answers::{AnswerSet, AnswerValue};
use crate::config::WizardConfig;
use crate::details::{Address, ContactDetails};
use crate::spec::{form::FormSpec, question::Question};
use crate::submission::{QuoteSubmission, build_submission};
use crate::validate::{ValidationError, validate_address, validate_contact};
use crate::visibility::{compute_visible_questions, questions_for_step, visible_step_numbers};

/// Address capture and contact capture follow the conditional steps.
pub const TRAILING_STEPS: usize = 2;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("question '{0}' is not part of this form")]
    UnknownQuestion(String),
    #[error("'{value}' is not an answer option of question '{question_id}'")]
    InvalidOption { question_id: String, value: String },
    #[error("question '{0}' accepts a single answer")]
    UnexpectedList(String),
    #[error("question '{0}' is not a multi-select question")]
    NotMultiSelect(String),
    #[error("required questions are unanswered: {}", .0.join(", "))]
    RequiredUnanswered(Vec<String>),
    #[error("{} field(s) are invalid", .0.len())]
    InvalidDetails(Vec<ValidationError>),
    #[error("already on the last step")]
    NoNextStep,
}

/// What the current wizard position shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepView<'a> {
    Question {
        step_number: u32,
        questions: Vec<&'a Question>,
    },
    Address,
    Contact,
}

impl StepView<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            StepView::Question { .. } => "question",
            StepView::Address => "address",
            StepView::Contact => "contact",
        }
    }
}

/// Returned after an answer is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// Set for single-choice answers: the host moves on after this delay.
    pub auto_advance: Option<Duration>,
}

/// One respondent's pass through a form.
///
/// Owns the answers and re-derives the visible step list from scratch after
/// every mutation; nothing else about visibility is cached.
#[derive(Debug, Clone)]
pub struct WizardSession {
    spec: FormSpec,
    config: WizardConfig,
    answers: AnswerSet,
    address: Address,
    contact: ContactDetails,
    position: usize,
    visible_steps: Vec<u32>,
}

impl WizardSession {
    pub fn new(spec: FormSpec, config: WizardConfig) -> Self {
        Self::with_answers(spec, config, AnswerSet::new())
    }

    pub fn with_answers(spec: FormSpec, config: WizardConfig, answers: AnswerSet) -> Self {
        let mut session = Self {
            spec,
            config,
            answers,
            address: Address::default(),
            contact: ContactDetails::default(),
            position: 1,
            visible_steps: Vec::new(),
        };
        session.refresh();
        session
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    pub fn visible_questions(&self) -> Vec<&Question> {
        compute_visible_questions(&self.spec.questions, &self.answers)
    }

    pub fn visible_steps(&self) -> &[u32] {
        &self.visible_steps
    }

    pub fn total_steps(&self) -> usize {
        self.visible_steps.len() + TRAILING_STEPS
    }

    /// 1-based position within `1..=total_steps()`.
    pub fn current_step(&self) -> usize {
        self.position
    }

    pub fn is_last_step(&self) -> bool {
        self.position == self.total_steps()
    }

    pub fn current_view(&self) -> StepView<'_> {
        let conditional = self.visible_steps.len();
        if self.position <= conditional {
            let step_number = self.visible_steps[self.position - 1];
            let visible = self.visible_questions();
            StepView::Question {
                step_number,
                questions: questions_for_step(&visible, step_number),
            }
        } else if self.position == conditional + 1 {
            StepView::Address
        } else {
            StepView::Contact
        }
    }

    pub fn answer(
        &mut self,
        question_id: &str,
        value: impl Into<AnswerValue>,
    ) -> Result<AnswerOutcome, SessionError> {
        let question = self.question(question_id)?;
        let value = match value.into() {
            AnswerValue::Single(single) if question.allow_multiple => {
                AnswerValue::Multiple(vec![single])
            }
            AnswerValue::Multiple(_) if !question.allow_multiple => {
                return Err(SessionError::UnexpectedList(question_id.to_string()));
            }
            value => value,
        };
        if let Some(invalid) = value
            .values()
            .into_iter()
            .find(|label| !question.accepts_option(label))
        {
            return Err(SessionError::InvalidOption {
                question_id: question_id.to_string(),
                value: invalid.to_string(),
            });
        }
        let auto_advance = question
            .is_single_choice()
            .then(|| self.config.auto_advance_delay());

        debug!(question_id, answer = %value.display(), "answer recorded");
        self.answers.insert(question_id, value);
        self.refresh();
        Ok(AnswerOutcome { auto_advance })
    }

    /// Selects or deselects one option of a multi-select question.
    pub fn toggle_option(&mut self, question_id: &str, label: &str) -> Result<(), SessionError> {
        let question = self.question(question_id)?;
        if !question.allow_multiple {
            return Err(SessionError::NotMultiSelect(question_id.to_string()));
        }
        if !question.accepts_option(label) {
            return Err(SessionError::InvalidOption {
                question_id: question_id.to_string(),
                value: label.to_string(),
            });
        }
        debug!(question_id, label, "option toggled");
        self.answers.toggle(question_id, label);
        self.refresh();
        Ok(())
    }

    pub fn clear_answer(&mut self, question_id: &str) -> Result<(), SessionError> {
        self.question(question_id)?;
        debug!(question_id, "answer cleared");
        self.answers.remove(question_id);
        self.refresh();
        Ok(())
    }

    pub fn set_address(&mut self, address: Address) {
        self.address = address;
    }

    pub fn set_contact(&mut self, contact: ContactDetails) {
        self.contact = contact;
    }

    /// Moves forward one step once the current one is complete.
    pub fn next(&mut self) -> Result<usize, SessionError> {
        if self.is_last_step() {
            return Err(SessionError::NoNextStep);
        }
        self.check_current_step()?;
        self.position += 1;
        debug!(step = self.position, total = self.total_steps(), "advanced");
        Ok(self.position)
    }

    /// Moves back one step; stays put on the first step.
    pub fn back(&mut self) -> usize {
        if self.position > 1 {
            self.position -= 1;
            debug!(step = self.position, total = self.total_steps(), "went back");
        }
        self.position
    }

    /// Required visible questions that still lack an answer.
    pub fn missing_required(&self) -> Vec<String> {
        self.visible_questions()
            .into_iter()
            .filter(|question| question.is_required && !self.answers.is_answered(&question.id))
            .map(|question| question.id.clone())
            .collect()
    }

    pub fn can_submit(&self) -> bool {
        self.missing_required().is_empty()
            && validate_address(&self.address).is_empty()
            && validate_contact(&self.contact).is_empty()
    }

    pub fn submission(&self) -> Result<QuoteSubmission, SessionError> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(SessionError::RequiredUnanswered(missing));
        }
        let mut errors = validate_address(&self.address);
        errors.extend(validate_contact(&self.contact));
        if !errors.is_empty() {
            return Err(SessionError::InvalidDetails(errors));
        }
        Ok(build_submission(
            &self.spec,
            &self.answers,
            &self.address,
            &self.contact,
        ))
    }

    fn question(&self, question_id: &str) -> Result<&Question, SessionError> {
        self.spec
            .question(question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(question_id.to_string()))
    }

    fn check_current_step(&self) -> Result<(), SessionError> {
        if !self.config.enforce_required {
            return Ok(());
        }
        match self.current_view() {
            StepView::Question { questions, .. } => {
                let missing: Vec<String> = questions
                    .iter()
                    .filter(|question| {
                        question.is_required && !self.answers.is_answered(&question.id)
                    })
                    .map(|question| question.id.clone())
                    .collect();
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(SessionError::RequiredUnanswered(missing))
                }
            }
            StepView::Address => {
                let errors = validate_address(&self.address);
                if errors.is_empty() {
                    Ok(())
                } else {
                    Err(SessionError::InvalidDetails(errors))
                }
            }
            StepView::Contact => Ok(()),
        }
    }

    fn refresh(&mut self) {
        let visible = compute_visible_questions(&self.spec.questions, &self.answers);
        self.visible_steps = visible_step_numbers(&visible);
        self.position = self.position.clamp(1, self.total_steps());
        debug!(
            visible_questions = visible.len(),
            visible_steps = self.visible_steps.len(),
            step = self.position,
            "visibility recomputed"
        );
    }
}
