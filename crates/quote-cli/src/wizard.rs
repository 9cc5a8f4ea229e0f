use std::fmt::Write;

use quote_spec::{AnswerSet, Question, QuoteSubmission, RenderPayload, render_text};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: question prompts only.
    Clean,
    /// Verbose output: status, visible questions, error details.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints prompts and results for the text wizard.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
    show_answers_json: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity, show_answers_json: bool) -> Self {
        Self {
            verbosity,
            header_printed: false,
            show_answers_json,
        }
    }

    pub fn show_header(&mut self, payload: &RenderPayload) {
        if self.header_printed {
            return;
        }
        println!("Form: {}", payload.form_title);
        if let Some(help) = &payload.help {
            println!("{}", help);
        }
        println!("Type 'back' to return to the previous step or 'exit' to quit.");
        self.header_printed = true;
    }

    pub fn show_status(&self, payload: &RenderPayload) {
        if self.verbosity.is_verbose() {
            println!("{}", render_text(payload));
        }
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = format!("{}/{} {}", prompt.step, prompt.total, prompt.title);
        if prompt.required {
            line.push_str(" *");
        }
        if prompt.multi_select {
            line.push_str(" (comma-separated, choose any)");
        }
        println!("{}", line);
        for (index, option) in prompt.options.iter().enumerate() {
            println!("  {}) {}", index + 1, option);
        }
    }

    pub fn show_field(&self, label: &str, required: bool) {
        if required {
            println!("{} *", label);
        } else {
            println!("{} (optional)", label);
        }
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if self.verbosity.is_verbose()
            && let Some(debug) = &error.debug_message
        {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_error(&self, message: &str) {
        eprintln!("{}", message);
    }

    pub fn show_completion(&self, submission: &QuoteSubmission, answers: &AnswerSet) {
        println!("Done ✅");
        match serde_json::to_string_pretty(submission) {
            Ok(pretty) => println!("{}", pretty),
            Err(err) => eprintln!("Failed to serialize submission: {}", err),
        }
        if self.verbosity.is_verbose() {
            match answers.to_cbor() {
                Ok(bytes) => println!("Answers (CBOR hex): {}", encode_hex(&bytes)),
                Err(err) => eprintln!("Failed to serialize answers to CBOR: {}", err),
            }
        }
        if self.show_answers_json {
            match answers.to_json_pretty() {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => eprintln!("Failed to serialize answers to JSON: {}", err),
            }
        }
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub step: usize,
    pub total: usize,
    pub title: String,
    pub required: bool,
    pub multi_select: bool,
    pub options: Vec<String>,
}

impl PromptContext {
    pub fn new(question: &Question, step: usize, total: usize) -> Self {
        Self {
            step,
            total,
            title: question.title().to_string(),
            required: question.is_required,
            multi_select: question.allow_multiple,
            options: question
                .option_labels()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut encoded, "{:02x}", byte).expect("writing to string cannot fail");
    }
    encoded
}
