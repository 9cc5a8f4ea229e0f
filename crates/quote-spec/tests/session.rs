use std::time::Duration;

use quote_spec::{
    Address, AnswerValue, ContactDetails, FormSpec, SessionError, StepView, WizardConfig,
    WizardSession,
};

fn fixture() -> FormSpec {
    FormSpec::from_json(include_str!("fixtures/boiler_quote.json")).expect("deserialize")
}

fn session() -> WizardSession {
    WizardSession::new(fixture(), WizardConfig::default())
}

fn view_ids(session: &WizardSession) -> Vec<String> {
    match session.current_view() {
        StepView::Question { questions, .. } => questions
            .iter()
            .map(|question| question.id.clone())
            .collect(),
        other => vec![other.kind().to_string()],
    }
}

fn address() -> Address {
    Address {
        line1: "1 High Street".into(),
        line2: None,
        city: Some("Leeds".into()),
        postcode: "LS1 1AA".into(),
    }
}

fn contact() -> ContactDetails {
    ContactDetails {
        full_name: "Sam Taylor".into(),
        email: "sam@example.com".into(),
        phone: "+44 113 496 0000".into(),
    }
}

#[test]
fn total_steps_adds_address_and_contact() {
    let mut session = session();
    assert_eq!(session.visible_steps(), &[1, 2, 4, 6]);
    assert_eq!(session.total_steps(), 6);

    session.answer("fuel", "Gas").expect("answer");
    assert_eq!(session.visible_steps(), &[1, 2, 3, 4, 6]);
    assert_eq!(session.total_steps(), 7);
}

#[test]
fn walks_forward_through_visible_steps_then_fixed_steps() {
    let mut session = session();
    assert_eq!(view_ids(&session), vec!["fuel"]);

    session.answer("fuel", "Oil").expect("answer");
    session.next().expect("step 2");
    session.answer("boiler_type", "Regular").expect("answer");
    session.next().expect("step 3");
    assert_eq!(view_ids(&session), vec!["oil_tank"]);
    session.next().expect("step 4");
    assert_eq!(view_ids(&session), vec!["features"]);
    session.next().expect("step 5");
    assert_eq!(view_ids(&session), vec!["timeline", "notes"]);
    session.answer("timeline", "ASAP").expect("answer");
    session.next().expect("address");
    assert_eq!(session.current_view(), StepView::Address);

    assert!(matches!(
        session.next(),
        Err(SessionError::InvalidDetails(_))
    ));
    session.set_address(address());
    session.next().expect("contact");
    assert_eq!(session.current_view(), StepView::Contact);
    assert!(session.is_last_step());
    assert!(matches!(session.next(), Err(SessionError::NoNextStep)));
}

#[test]
fn required_question_blocks_next() {
    let mut session = session();
    match session.next() {
        Err(SessionError::RequiredUnanswered(ids)) => assert_eq!(ids, vec!["fuel"]),
        other => panic!("expected required error, got {:?}", other),
    }
    assert_eq!(session.current_step(), 1);
}

#[test]
fn required_check_can_be_relaxed() {
    let config = WizardConfig {
        enforce_required: false,
        ..WizardConfig::default()
    };
    let mut session = WizardSession::new(fixture(), config);
    assert_eq!(session.next().expect("advance"), 2);
}

#[test]
fn back_stops_at_first_step() {
    let mut session = session();
    session.answer("fuel", "Gas").expect("answer");
    session.next().expect("advance");
    assert_eq!(session.back(), 1);
    assert_eq!(session.back(), 1);
}

#[test]
fn single_choice_answers_request_auto_advance() {
    let mut session = session();
    let outcome = session.answer("fuel", "Gas").expect("answer");
    assert_eq!(outcome.auto_advance, Some(Duration::from_millis(300)));

    let outcome = session
        .answer("features", vec!["Thermostat"])
        .expect("answer");
    assert_eq!(outcome.auto_advance, None);

    let outcome = session.answer("notes", "Side access only").expect("answer");
    assert_eq!(outcome.auto_advance, None);
}

#[test]
fn answers_are_checked_against_the_form() {
    let mut session = session();
    assert!(matches!(
        session.answer("missing", "x"),
        Err(SessionError::UnknownQuestion(_))
    ));
    assert!(matches!(
        session.answer("fuel", "Coal"),
        Err(SessionError::InvalidOption { .. })
    ));
    assert!(matches!(
        session.answer("fuel", vec!["Gas", "Oil"]),
        Err(SessionError::UnexpectedList(_))
    ));
    assert!(matches!(
        session.toggle_option("fuel", "Gas"),
        Err(SessionError::NotMultiSelect(_))
    ));
}

#[test]
fn scalar_answer_to_multi_select_becomes_a_selection() {
    let mut session = session();
    session.answer("features", "Thermostat").expect("answer");
    assert_eq!(
        session.answers().get("features"),
        Some(&AnswerValue::from(vec!["Thermostat"]))
    );
}

#[test]
fn toggling_options_updates_visibility() {
    let mut session = session();
    session.answer("boiler_type", "Combi").expect("answer");
    assert!(!session.visible_steps().contains(&5));

    session
        .toggle_option("features", "Smart controls")
        .expect("toggle");
    assert!(session.visible_steps().contains(&5));

    session
        .toggle_option("features", "Smart controls")
        .expect("toggle");
    assert!(!session.visible_steps().contains(&5));
}

#[test]
fn shrinking_the_step_list_clamps_position() {
    let config = WizardConfig {
        enforce_required: false,
        ..WizardConfig::default()
    };
    let mut session = WizardSession::new(fixture(), config);
    session.answer("fuel", "Gas").expect("answer");
    session.answer("boiler_type", "Combi").expect("answer");
    session
        .answer("features", vec!["Smart controls"])
        .expect("answer");
    assert_eq!(session.total_steps(), 8);
    while !session.is_last_step() {
        session.next().expect("advance");
    }
    assert_eq!(session.current_step(), 8);

    session.clear_answer("fuel").expect("clear");
    assert_eq!(session.total_steps(), 7);
    assert_eq!(session.current_step(), 7);
    assert_eq!(session.current_view(), StepView::Contact);
}

#[test]
fn submission_contains_only_visible_answers() {
    let mut session = session();
    session.answer("fuel", "Oil").expect("answer");
    session.answer("oil_tank", "Garden").expect("answer");
    session.answer("boiler_type", "Regular").expect("answer");
    session.answer("timeline", "ASAP").expect("answer");
    assert!(!session.can_submit());

    session.set_address(address());
    session.set_contact(contact());
    assert!(session.can_submit());

    session.answer("fuel", "Electric").expect("answer");
    let submission = session.submission().expect("submission");
    let ids: Vec<&str> = submission
        .answers
        .iter()
        .map(|answer| answer.question_id.as_str())
        .collect();
    assert_eq!(ids, vec!["fuel", "boiler_type", "timeline"]);
    assert_eq!(submission.category.as_deref(), Some("boiler"));
    assert_eq!(
        submission.answers[0].question,
        "What fuel does your boiler use?"
    );
}

#[test]
fn submission_reports_invalid_contact() {
    let mut session = session();
    session.answer("fuel", "Electric").expect("answer");
    session.answer("boiler_type", "Combi").expect("answer");
    session.answer("timeline", "ASAP").expect("answer");
    session.set_address(address());
    session.set_contact(ContactDetails {
        email: "not-an-email".into(),
        ..contact()
    });
    match session.submission() {
        Err(SessionError::InvalidDetails(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].code.as_deref(), Some("invalid_email"));
        }
        other => panic!("expected invalid details, got {:?}", other),
    }
}
