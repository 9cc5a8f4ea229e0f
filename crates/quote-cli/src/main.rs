mod wizard;

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use quote_spec::{
    Address, AnswerSet, AnswerValue, ContactDetails, FormSpec, LintReport, Question,
    QuoteSubmission, SessionError, StepView, ValidationResult, WizardConfig, WizardSession,
    build_render_payload, compute_visible_questions, form_schema, lint_form, validate_answers,
    visible_step_numbers,
};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wizard::{AnswerParseError, PromptContext, Verbosity, WizardPresenter};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const AUTO_ADVANCE_ENV: &str = "QUOTE_WIZARD_AUTO_ADVANCE_MS";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Quote wizard CLI",
    long_about = "Evaluates conditional question visibility, lints form definitions, and runs the quote wizard in a text shell"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Print the questions and steps visible for a set of answers.
    Visible {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Optional JSON file containing answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Check a form definition for broken or suspicious conditions.
    Lint {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
    },
    /// Validate answers against a form definition.
    Validate {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to the answers JSON file.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Run the quote wizard in a text shell.
    Wizard {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Optional JSON file containing initial answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Show verbose output (status, visible questions, debug logs).
        #[arg(long, alias = "debug")]
        verbose: bool,
        /// Also emit answer JSON once the wizard completes.
        #[arg(long)]
        answers_json: bool,
    },
    /// Print the JSON Schema of form definitions.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let verbose = matches!(cli.command, Command::Wizard { verbose: true, .. });
    init_tracing(verbose);

    match cli.command {
        Command::Visible {
            form,
            answers,
            format,
        } => run_visible(form, answers, format),
        Command::Lint { form } => run_lint(form),
        Command::Validate { form, answers } => run_validate(form, answers),
        Command::Wizard {
            form,
            answers,
            verbose,
            answers_json,
        } => run_wizard(form, answers, verbose, answers_json),
        Command::Schema => run_schema(),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_form(path: &Path) -> CliResult<FormSpec> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read form {}: {}", path.display(), err))?;
    let spec = FormSpec::from_json(&contents)
        .map_err(|err| format!("failed to parse form {}: {}", path.display(), err))?;
    debug!(form_id = %spec.id, questions = spec.questions.len(), "form loaded");
    Ok(spec)
}

fn load_answers(path: Option<&Path>) -> CliResult<AnswerSet> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .map_err(|err| format!("failed to read answers {}: {}", path.display(), err))?;
            let answers = AnswerSet::from_json(&contents)
                .map_err(|err| format!("failed to parse answers {}: {}", path.display(), err))?;
            Ok(answers)
        }
        None => Ok(AnswerSet::new()),
    }
}

fn wizard_config() -> CliResult<WizardConfig> {
    let mut config = WizardConfig::default();
    if let Some(raw) = env::var_os(AUTO_ADVANCE_ENV) {
        let raw = raw.to_string_lossy();
        config.auto_advance_delay_ms = raw
            .trim()
            .parse()
            .map_err(|_| format!("{} must be a whole number of milliseconds", AUTO_ADVANCE_ENV))?;
    }
    Ok(config)
}

fn run_visible(
    form_path: PathBuf,
    answers_path: Option<PathBuf>,
    format: OutputFormat,
) -> CliResult<()> {
    let spec = load_form(&form_path)?;
    let answers = load_answers(answers_path.as_deref())?;
    let visible = compute_visible_questions(&spec.questions, &answers);
    let steps = visible_step_numbers(&visible);
    let total_steps = steps.len() + quote_spec::TRAILING_STEPS;

    match format {
        OutputFormat::Json => {
            let ids: Vec<&str> = visible.iter().map(|question| question.id.as_str()).collect();
            let output = json!({
                "visible_questions": ids,
                "visible_steps": steps,
                "total_steps": total_steps,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("Visible questions:");
            for question in &visible {
                println!(
                    " - {} (step {}) {}",
                    question.id,
                    question.step_number,
                    question.title()
                );
            }
            let steps = steps
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            println!("Visible steps: {}", steps);
            println!("Total steps: {}", total_steps);
        }
    }
    Ok(())
}

fn run_lint(form_path: PathBuf) -> CliResult<()> {
    let spec = load_form(&form_path)?;
    let report = lint_form(&spec);
    describe_lint(&report);
    if report.has_errors() {
        Err("form definition has errors".into())
    } else {
        Ok(())
    }
}

fn describe_lint(report: &LintReport) {
    if report.is_clean() {
        println!("No issues found.");
        return;
    }
    for issue in &report.issues {
        println!(
            "{} {} [{}] {}",
            issue.severity.as_str(),
            issue.question_id,
            issue.code,
            issue.message
        );
    }
}

fn run_validate(form_path: PathBuf, answers_path: PathBuf) -> CliResult<()> {
    let spec = load_form(&form_path)?;
    let answers = load_answers(Some(answers_path.as_path()))?;

    let result = validate_answers(&spec, &answers);
    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ValidationResult) {
    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            println!(
                "  {} - {}",
                error.path.as_deref().unwrap_or("<unknown>"),
                error.message
            );
        }
    }
    if !result.missing_required.is_empty() {
        println!(
            "Missing required answers: {}",
            result.missing_required.join(", ")
        );
    }
    if !result.unknown_fields.is_empty() {
        println!(
            "Unknown answer fields: {}",
            result.unknown_fields.join(", ")
        );
    }
}

fn run_schema() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&form_schema())?);
    Ok(())
}

fn run_wizard(
    form_path: PathBuf,
    answers_path: Option<PathBuf>,
    verbose: bool,
    answers_json: bool,
) -> CliResult<()> {
    let spec = load_form(&form_path)?;
    let answers = load_answers(answers_path.as_deref())?;
    let mut session = WizardSession::with_answers(spec, wizard_config()?, answers);
    let mut presenter = WizardPresenter::new(Verbosity::from_verbose(verbose), answers_json);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let submission = drive_wizard(&mut session, &mut presenter, &mut input)?;
    presenter.show_completion(&submission, session.answers());
    Ok(())
}

/// One line of user input.
enum Input {
    Value(String),
    Back,
}

/// Owned copy of the current step view, so the session can be mutated while
/// the step is being answered.
enum Screen {
    Questions(Vec<Question>),
    Address,
    Contact,
}

fn drive_wizard<R: BufRead>(
    session: &mut WizardSession,
    presenter: &mut WizardPresenter,
    input: &mut R,
) -> CliResult<QuoteSubmission> {
    loop {
        let payload = build_render_payload(session);
        presenter.show_header(&payload);
        presenter.show_status(&payload);

        let screen = match session.current_view() {
            StepView::Question { questions, .. } => {
                Screen::Questions(questions.into_iter().cloned().collect())
            }
            StepView::Address => Screen::Address,
            StepView::Contact => Screen::Contact,
        };

        match screen {
            Screen::Questions(questions) => {
                if !ask_step_questions(session, presenter, input, &questions)? {
                    session.back();
                    continue;
                }
                if let Err(err) = session.next() {
                    presenter.show_error(&err.to_string());
                }
            }
            Screen::Address => {
                let Some(address) = ask_address(presenter, input)? else {
                    session.back();
                    continue;
                };
                session.set_address(address);
                if let Err(err) = session.next() {
                    show_session_error(presenter, &err);
                }
            }
            Screen::Contact => {
                let Some(contact) = ask_contact(presenter, input)? else {
                    session.back();
                    continue;
                };
                session.set_contact(contact);
                match session.submission() {
                    Ok(submission) => return Ok(submission),
                    Err(err) => show_session_error(presenter, &err),
                }
            }
        }
    }
}

/// Returns `false` when the user asked to go back.
fn ask_step_questions<R: BufRead>(
    session: &mut WizardSession,
    presenter: &WizardPresenter,
    input: &mut R,
    questions: &[Question],
) -> CliResult<bool> {
    let (step, total) = (session.current_step(), session.total_steps());
    for question in questions {
        let prompt = PromptContext::new(question, step, total);
        loop {
            presenter.show_prompt(&prompt);
            let raw = match read_input(input)? {
                Input::Back => return Ok(false),
                Input::Value(raw) => raw,
            };
            if raw.is_empty() {
                if question.is_required {
                    presenter.show_parse_error(&AnswerParseError::new(
                        "This question requires an answer.",
                        None,
                    ));
                    continue;
                }
                session.clear_answer(&question.id)?;
                break;
            }
            let value = match parse_answer(question, &raw) {
                Ok(value) => value,
                Err(err) => {
                    presenter.show_parse_error(&err);
                    continue;
                }
            };
            match session.answer(&question.id, value) {
                Ok(outcome) => {
                    if let Some(delay) = outcome.auto_advance {
                        debug!(question_id = %question.id, ?delay, "auto-advance requested");
                    }
                    break;
                }
                Err(err) => presenter.show_error(&err.to_string()),
            }
        }
    }
    Ok(true)
}

fn ask_address<R: BufRead>(
    presenter: &WizardPresenter,
    input: &mut R,
) -> CliResult<Option<Address>> {
    println!("Property address");
    let Some(line1) = ask_field(presenter, input, "Address line 1", true)? else {
        return Ok(None);
    };
    let Some(line2) = ask_field(presenter, input, "Address line 2", false)? else {
        return Ok(None);
    };
    let Some(city) = ask_field(presenter, input, "Town or city", false)? else {
        return Ok(None);
    };
    let Some(postcode) = ask_field(presenter, input, "Postcode", true)? else {
        return Ok(None);
    };
    Ok(Some(Address {
        line1,
        line2: Some(line2).filter(|value| !value.is_empty()),
        city: Some(city).filter(|value| !value.is_empty()),
        postcode,
    }))
}

fn ask_contact<R: BufRead>(
    presenter: &WizardPresenter,
    input: &mut R,
) -> CliResult<Option<ContactDetails>> {
    println!("Contact details");
    let Some(full_name) = ask_field(presenter, input, "Full name", true)? else {
        return Ok(None);
    };
    let Some(email) = ask_field(presenter, input, "Email", true)? else {
        return Ok(None);
    };
    let Some(phone) = ask_field(presenter, input, "Phone", true)? else {
        return Ok(None);
    };
    Ok(Some(ContactDetails {
        full_name,
        email,
        phone,
    }))
}

fn ask_field<R: BufRead>(
    presenter: &WizardPresenter,
    input: &mut R,
    label: &str,
    required: bool,
) -> CliResult<Option<String>> {
    presenter.show_field(label, required);
    match read_input(input)? {
        Input::Back => Ok(None),
        Input::Value(value) => Ok(Some(value)),
    }
}

fn read_input<R: BufRead>(input: &mut R) -> CliResult<Input> {
    print!("> ");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err("unexpected end of input".into());
    }
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case("exit") {
        return Err("wizard aborted by user".into());
    }
    if trimmed.eq_ignore_ascii_case("back") {
        return Ok(Input::Back);
    }
    Ok(Input::Value(trimmed.to_string()))
}

fn show_session_error(presenter: &WizardPresenter, err: &SessionError) {
    match err {
        SessionError::InvalidDetails(errors) => {
            for error in errors {
                presenter.show_error(&format!(
                    "  {}: {}",
                    error.path.as_deref().unwrap_or("<unknown>"),
                    error.message
                ));
            }
        }
        other => presenter.show_error(&other.to_string()),
    }
}

/// Parses raw input for `question`. Choices may be given by number or by
/// label; multi-select answers are comma-separated.
fn parse_answer(question: &Question, raw: &str) -> Result<AnswerValue, AnswerParseError> {
    if !question.is_multiple_choice {
        return Ok(AnswerValue::Single(raw.to_string()));
    }
    if question.allow_multiple {
        let selected = raw
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| parse_choice(question, token))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AnswerValue::Multiple(selected))
    } else {
        parse_choice(question, raw).map(AnswerValue::Single)
    }
}

fn parse_choice(question: &Question, raw: &str) -> Result<String, AnswerParseError> {
    let labels = question.option_labels();
    if labels.is_empty() {
        return Ok(raw.to_string());
    }
    if let Ok(index) = raw.parse::<usize>()
        && let Some(label) = index.checked_sub(1).and_then(|index| labels.get(index))
    {
        return Ok(label.to_string());
    }
    labels
        .iter()
        .find(|label| label.eq_ignore_ascii_case(raw))
        .map(|label| label.to_string())
        .ok_or_else(|| {
            AnswerParseError::new(
                format!("Choose one of: {}.", labels.join(", ")),
                Some(format!("option number 1-{} or label", labels.len())),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const FIXTURE: &str = include_str!("../../quote-spec/tests/fixtures/boiler_quote.json");

    fn fixture_session() -> WizardSession {
        let spec = FormSpec::from_json(FIXTURE).expect("fixture");
        WizardSession::new(spec, WizardConfig::default())
    }

    fn fuel_question() -> Question {
        Question::new("fuel", 1).with_options(["Gas", "LPG", "Oil"])
    }

    #[test]
    fn parse_answer_accepts_option_number() {
        assert_eq!(
            parse_answer(&fuel_question(), "2").unwrap(),
            AnswerValue::from("LPG")
        );
    }

    #[test]
    fn parse_answer_matches_labels_case_insensitively() {
        assert_eq!(
            parse_answer(&fuel_question(), "oil").unwrap(),
            AnswerValue::from("Oil")
        );
    }

    #[test]
    fn parse_answer_rejects_unknown_choice() {
        assert!(parse_answer(&fuel_question(), "Coal").is_err());
        assert!(parse_answer(&fuel_question(), "0").is_err());
        assert!(parse_answer(&fuel_question(), "4").is_err());
    }

    #[test]
    fn parse_answer_splits_multi_select() {
        let question = fuel_question().multi_select();
        assert_eq!(
            parse_answer(&question, "1, oil").unwrap(),
            AnswerValue::from(vec!["Gas", "Oil"])
        );
    }

    #[test]
    fn parse_answer_keeps_free_text() {
        let question = Question::new("notes", 2);
        assert_eq!(
            parse_answer(&question, "Side gate, 2").unwrap(),
            AnswerValue::from("Side gate, 2")
        );
    }

    #[test]
    fn drive_wizard_collects_a_submission() {
        let mut session = fixture_session();
        let mut presenter = WizardPresenter::new(Verbosity::Clean, false);
        let lines = [
            "1",
            "Combi",
            "Yes",
            "",
            "ASAP",
            "",
            "1 High Street",
            "",
            "Leeds",
            "LS1 1AA",
            "Sam Taylor",
            "sam@example.com",
            "07700 900123",
        ];
        let mut input = Cursor::new(format!("{}\n", lines.join("\n")));
        let submission =
            drive_wizard(&mut session, &mut presenter, &mut input).expect("submission");

        let ids: Vec<&str> = submission
            .answers
            .iter()
            .map(|answer| answer.question_id.as_str())
            .collect();
        assert_eq!(ids, vec!["fuel", "boiler_type", "gas_meter", "timeline"]);
        assert_eq!(submission.address.city.as_deref(), Some("Leeds"));
        assert_eq!(submission.contact.email, "sam@example.com");
    }

    #[test]
    fn drive_wizard_goes_back_and_changes_branch() {
        let mut session = fixture_session();
        let mut presenter = WizardPresenter::new(Verbosity::Clean, false);
        let lines = [
            "Gas",
            "System",
            "back",
            "back",
            "Oil",
            "System",
            "Garage",
            "",
            "3",
            "",
            "1 High Street",
            "",
            "",
            "LS1 1AA",
            "Sam Taylor",
            "sam@example.com",
            "07700 900123",
        ];
        let mut input = Cursor::new(format!("{}\n", lines.join("\n")));
        let submission =
            drive_wizard(&mut session, &mut presenter, &mut input).expect("submission");

        let ids: Vec<&str> = submission
            .answers
            .iter()
            .map(|answer| answer.question_id.as_str())
            .collect();
        assert_eq!(ids, vec!["fuel", "boiler_type", "oil_tank", "timeline"]);
        assert_eq!(submission.answers[3].value, AnswerValue::from("Just researching"));
    }

    #[test]
    fn drive_wizard_fails_on_end_of_input() {
        let mut session = fixture_session();
        let mut presenter = WizardPresenter::new(Verbosity::Clean, false);
        let mut input = Cursor::new("1\n");
        assert!(drive_wizard(&mut session, &mut presenter, &mut input).is_err());
    }
}
