use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// One selectable answer: a plain label or a label with an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnswerOption {
    Label(String),
    Image {
        label: String,
        #[serde(
            rename = "imageRef",
            alias = "image_ref",
            alias = "image_url",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        image_ref: Option<String>,
    },
}

impl AnswerOption {
    pub fn label(&self) -> &str {
        match self {
            AnswerOption::Label(label) => label,
            AnswerOption::Image { label, .. } => label,
        }
    }

    pub fn image_ref(&self) -> Option<&str> {
        match self {
            AnswerOption::Label(_) => None,
            AnswerOption::Image { image_ref, .. } => image_ref.as_deref(),
        }
    }
}

/// A single form prompt, optionally gated by a condition on earlier answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(alias = "step_number")]
    pub step_number: u32,
    #[serde(default, alias = "display_order")]
    pub display_order: i32,
    #[serde(default, alias = "question_text")]
    pub question_text: String,
    #[serde(default, alias = "is_multiple_choice")]
    pub is_multiple_choice: bool,
    #[serde(default, alias = "allow_multiple")]
    pub allow_multiple: bool,
    #[serde(default, alias = "answer_options", skip_serializing_if = "Vec::is_empty")]
    pub answer_options: Vec<AnswerOption>,
    #[serde(default, alias = "is_required")]
    pub is_required: bool,
    #[serde(
        default,
        alias = "conditional_logic",
        skip_serializing_if = "Option::is_none"
    )]
    pub condition: Option<Condition>,
}

impl Question {
    pub fn new(id: impl Into<String>, step_number: u32) -> Self {
        Self {
            id: id.into(),
            step_number,
            display_order: 0,
            question_text: String::new(),
            is_multiple_choice: false,
            allow_multiple: false,
            answer_options: Vec::new(),
            is_required: false,
            condition: None,
        }
    }

    pub fn with_display_order(mut self, display_order: i32) -> Self {
        self.display_order = display_order;
        self
    }

    /// Turns the question into a multiple-choice prompt over `labels`.
    pub fn with_options<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.is_multiple_choice = true;
        self.answer_options = labels
            .into_iter()
            .map(|label| AnswerOption::Label(label.into()))
            .collect();
        self
    }

    pub fn multi_select(mut self) -> Self {
        self.allow_multiple = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Multiple choice with exactly one pick. Such answers auto-advance.
    pub fn is_single_choice(&self) -> bool {
        self.is_multiple_choice && !self.allow_multiple
    }

    pub fn option_labels(&self) -> Vec<&str> {
        self.answer_options.iter().map(AnswerOption::label).collect()
    }

    /// Whether `label` is an acceptable value. Free-text questions and
    /// choice questions without options accept anything.
    pub fn accepts_option(&self, label: &str) -> bool {
        !self.is_multiple_choice
            || self.answer_options.is_empty()
            || self.answer_options.iter().any(|option| option.label() == label)
    }

    /// Prompt text, falling back to the id for untitled questions.
    pub fn title(&self) -> &str {
        if self.question_text.is_empty() {
            &self.id
        } else {
            &self.question_text
        }
    }
}
