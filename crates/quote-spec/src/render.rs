use serde_json::{Map, Value, json};

use crate::{
    answers::AnswerValue,
    session::{StepView, WizardSession},
    visibility::resolve_visibility,
};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// More input is required.
    NeedInput,
    /// Every required answer and detail is present.
    Complete,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Complete => "complete",
        }
    }
}

/// Step counters exposed to renderers.
#[derive(Debug, Clone)]
pub struct RenderProgress {
    pub current_step: usize,
    pub total_steps: usize,
    pub answered: usize,
    pub visible: usize,
}

/// Describes a single question for render outputs.
#[derive(Debug, Clone)]
pub struct RenderQuestion {
    pub id: String,
    pub title: String,
    pub step_number: u32,
    pub display_order: i32,
    pub required: bool,
    pub multi_select: bool,
    pub visible: bool,
    pub current_value: Option<AnswerValue>,
    pub options: Vec<String>,
}

/// The screen at the current position.
#[derive(Debug, Clone)]
pub struct RenderView {
    pub kind: &'static str,
    pub step_number: Option<u32>,
    pub question_ids: Vec<String>,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub form_id: String,
    pub form_title: String,
    pub status: RenderStatus,
    pub progress: RenderProgress,
    pub help: Option<String>,
    pub view: RenderView,
    pub questions: Vec<RenderQuestion>,
}

/// Build the renderer payload from the session state.
pub fn build_render_payload(session: &WizardSession) -> RenderPayload {
    let spec = session.spec();
    let answers = session.answers();
    let visibility = resolve_visibility(spec, answers);

    let questions = spec
        .questions
        .iter()
        .map(|question| RenderQuestion {
            id: question.id.clone(),
            title: question.title().to_string(),
            step_number: question.step_number,
            display_order: question.display_order,
            required: question.is_required,
            multi_select: question.allow_multiple,
            visible: visibility.get(&question.id).copied().unwrap_or(true),
            current_value: answers.get(&question.id).cloned(),
            options: question
                .option_labels()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect::<Vec<_>>();

    let visible = questions.iter().filter(|question| question.visible).count();
    let answered = questions
        .iter()
        .filter(|question| question.visible && answers.is_answered(&question.id))
        .count();

    let view = match session.current_view() {
        StepView::Question {
            step_number,
            questions: step_questions,
        } => RenderView {
            kind: "question",
            step_number: Some(step_number),
            question_ids: step_questions
                .iter()
                .map(|question| question.id.clone())
                .collect(),
        },
        other => RenderView {
            kind: other.kind(),
            step_number: None,
            question_ids: Vec::new(),
        },
    };

    let status = if session.can_submit() {
        RenderStatus::Complete
    } else {
        RenderStatus::NeedInput
    };

    RenderPayload {
        form_id: spec.id.clone(),
        form_title: spec.title.clone(),
        status,
        progress: RenderProgress {
            current_step: session.current_step(),
            total_steps: session.total_steps(),
            answered,
            visible,
        },
        help: spec.description.clone(),
        view,
        questions,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let questions = payload
        .questions
        .iter()
        .map(|question| {
            let mut map = Map::new();
            map.insert("id".into(), Value::String(question.id.clone()));
            map.insert("title".into(), Value::String(question.title.clone()));
            map.insert("step_number".into(), json!(question.step_number));
            map.insert("display_order".into(), json!(question.display_order));
            map.insert("required".into(), Value::Bool(question.required));
            map.insert("multi_select".into(), Value::Bool(question.multi_select));
            if !question.options.is_empty() {
                map.insert("options".into(), json!(question.options));
            }
            if let Some(current_value) = &question.current_value {
                map.insert("current_value".into(), json!(current_value));
            }
            map.insert("visible".into(), Value::Bool(question.visible));
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "form_id": payload.form_id,
        "form_title": payload.form_title,
        "status": payload.status.as_str(),
        "progress": {
            "current_step": payload.progress.current_step,
            "total_steps": payload.progress.total_steps,
            "answered": payload.progress.answered,
            "visible": payload.progress.visible,
        },
        "help": payload.help,
        "view": {
            "kind": payload.view.kind,
            "step_number": payload.view.step_number,
            "question_ids": payload.view.question_ids,
        },
        "questions": questions,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {} ({})", payload.form_title, payload.form_id));
    lines.push(format!(
        "Status: {} (step {}/{}, {}/{} answered)",
        payload.status.as_str(),
        payload.progress.current_step,
        payload.progress.total_steps,
        payload.progress.answered,
        payload.progress.visible
    ));
    if let Some(help) = &payload.help {
        lines.push(format!("Help: {}", help));
    }

    match payload.view.step_number {
        Some(step) => lines.push(format!(
            "Current step: {} [{}]",
            step,
            payload.view.question_ids.join(", ")
        )),
        None => lines.push(format!("Current step: {}", payload.view.kind)),
    }

    lines.push("Visible questions:".to_string());
    for question in payload.questions.iter().filter(|question| question.visible) {
        let mut entry = format!(
            " - {} (step {}) {}",
            question.id, question.step_number, question.title
        );
        if question.required {
            entry.push_str(" [required]");
        }
        if let Some(current_value) = &question.current_value {
            entry.push_str(&format!(" = {}", current_value.display()));
        }
        lines.push(entry);
    }

    lines.join("\n")
}
