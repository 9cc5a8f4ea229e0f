use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value;

const FORM: &str = include_str!("../../quote-spec/tests/fixtures/boiler_quote.json");

fn form_file(dir: &assert_fs::TempDir) -> assert_fs::fixture::ChildPath {
    let form = dir.child("form.json");
    form.write_str(FORM).unwrap();
    form
}

#[test]
fn visible_lists_questions_for_answers() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let form = form_file(&dir);
    let answers = dir.child("answers.json");
    answers.write_str(r#"{"fuel": "Oil"}"#)?;

    Command::cargo_bin("quote-wizard")?
        .arg("visible")
        .arg("--form")
        .arg(form.path())
        .arg("--answers")
        .arg(answers.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(" - oil_tank (step 3)"))
        .stdout(predicate::str::contains("gas_meter").not())
        .stdout(predicate::str::contains("Visible steps: 1, 2, 3, 4, 6"))
        .stdout(predicate::str::contains("Total steps: 7"));
    Ok(())
}

#[test]
fn visible_json_reports_steps() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let form = form_file(&dir);

    let output = Command::cargo_bin("quote-wizard")?
        .args(["visible", "--format", "json", "--form"])
        .arg(form.path())
        .output()?;
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["visible_steps"], serde_json::json!([1, 2, 4, 6]));
    assert_eq!(value["total_steps"], 6);
    Ok(())
}

#[test]
fn lint_fails_on_dangling_reference() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let form = dir.child("broken.json");
    form.write_str(
        r#"{
            "id": "broken",
            "title": "Broken",
            "questions": [
                { "id": "q1", "stepNumber": 1 },
                {
                    "id": "q2",
                    "stepNumber": 2,
                    "condition": { "dependsOnQuestionId": "q9", "matchValues": ["x"] }
                }
            ]
        }"#,
    )?;

    Command::cargo_bin("quote-wizard")?
        .arg("lint")
        .arg("--form")
        .arg(form.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("error q2 [dangling_reference]"));
    Ok(())
}

#[test]
fn lint_passes_fixture() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let form = form_file(&dir);

    Command::cargo_bin("quote-wizard")?
        .arg("lint")
        .arg("--form")
        .arg(form.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found."));
    Ok(())
}

#[test]
fn validate_reports_missing_answers() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let form = form_file(&dir);
    let answers = dir.child("answers.json");
    answers.write_str(r#"{"fuel": "Gas"}"#)?;

    Command::cargo_bin("quote-wizard")?
        .arg("validate")
        .arg("--form")
        .arg(form.path())
        .arg("--answers")
        .arg(answers.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Validation result: invalid"))
        .stdout(predicate::str::contains(
            "Missing required answers: boiler_type, gas_meter, timeline",
        ));
    Ok(())
}

#[test]
fn wizard_runs_to_submission() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let form = form_file(&dir);
    let lines = [
        "Electric",
        "2",
        "Thermostat",
        "1",
        "",
        "9 Church Road",
        "",
        "York",
        "YO1 7HH",
        "Alex Doe",
        "alex@example.org",
        "07700 900123",
    ];

    Command::cargo_bin("quote-wizard")?
        .arg("wizard")
        .arg("--form")
        .arg(form.path())
        .arg("--answers-json")
        .write_stdin(format!("{}\n", lines.join("\n")))
        .assert()
        .success()
        .stdout(predicate::str::contains("Done ✅"))
        .stdout(predicate::str::contains("\"formId\": \"boiler-quote\""))
        .stdout(predicate::str::contains("\"postcode\": \"YO1 7HH\""))
        .stdout(predicate::str::contains("\"features\": ["));
    Ok(())
}

#[test]
fn wizard_rejects_bad_auto_advance_setting() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let form = form_file(&dir);

    Command::cargo_bin("quote-wizard")?
        .env("QUOTE_WIZARD_AUTO_ADVANCE_MS", "soon")
        .arg("wizard")
        .arg("--form")
        .arg(form.path())
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("QUOTE_WIZARD_AUTO_ADVANCE_MS"));
    Ok(())
}

#[test]
fn schema_describes_questions() -> Result<(), Box<dyn std::error::Error>> {
    Command::cargo_bin("quote-wizard")?
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("stepNumber"))
        .stdout(predicate::str::contains("dependsOnQuestionId"));
    Ok(())
}
