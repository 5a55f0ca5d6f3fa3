//! Wizard from empty form to submission payload.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use ideahub::config::Config;
use ideahub::tea::{update, Command, Message, Model, NotificationLevel};
use ideahub::wizard::{Advance, Field, StepMarker, WizardState, MAX_TAGS};

use super::fixtures::filled_wizard;

fn key(code: KeyCode) -> Message {
    Message::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn ctrl(c: char) -> Message {
    Message::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

fn type_text(model: &mut Model, text: &str) {
    for c in text.chars() {
        update(model, key(KeyCode::Char(c)));
    }
}

#[test]
fn test_title_length_gates_step_one() {
    let mut wizard = WizardState::default();
    wizard.set_field(Field::Category, "Health");
    wizard.set_field(Field::Stage, "Idea");

    wizard.set_field(Field::Title, "AB");
    let result = wizard.validate(1);
    assert!(result.message(Field::Title).is_some());
    assert!(matches!(wizard.advance(), Advance::Blocked(_)));
    assert_eq!(wizard.current_step(), 1);

    wizard.set_field(Field::Title, "  A Great Idea  ");
    assert!(wizard.validate(1).is_valid());
    assert_eq!(wizard.advance(), Advance::Moved(2));
}

#[test]
fn test_problem_statement_minimum_is_inclusive() {
    let mut wizard = filled_wizard();
    wizard.set_field(Field::ProblemStatement, "x".repeat(49));
    assert!(wizard
        .validate(2)
        .message(Field::ProblemStatement)
        .is_some());

    wizard.set_field(Field::ProblemStatement, "x".repeat(50));
    assert!(wizard.validate(2).is_valid());
}

#[test]
fn test_seeking_collaborators_requires_team_needs() {
    let mut wizard = filled_wizard();
    wizard.fields_mut().set_seeking_collaborators(true);
    assert!(wizard.validate(3).message(Field::TeamNeeds).is_some());

    wizard.set_field(Field::TeamNeeds, "A hardware tinkerer and a designer");
    assert!(wizard.validate(3).is_valid());

    wizard.fields_mut().set_seeking_collaborators(false);
    assert_eq!(wizard.fields().get(Field::TeamNeeds), "");
}

#[test]
fn test_tags_are_normalized_unique_and_capped() {
    let mut wizard = WizardState::default();
    assert!(wizard.add_tag("  Solar "));
    assert!(!wizard.add_tag("SOLAR"));
    assert!(!wizard.add_tag("   "));
    for i in 1..MAX_TAGS {
        assert!(wizard.add_tag(&format!("tag{}", i)));
    }
    assert_eq!(wizard.tags().len(), MAX_TAGS);
    assert!(!wizard.add_tag("one-more"));

    assert_eq!(wizard.remove_tag(0).unwrap(), "solar");
    assert!(wizard.remove_tag(MAX_TAGS).is_err());
    assert!(wizard.add_tag("one-more"));
}

#[test]
fn test_go_to_step_keeps_field_values() {
    let mut wizard = filled_wizard();
    let before = wizard.fields().clone();

    wizard.go_to_step(4).unwrap();
    assert_eq!(wizard.step_marker(1), StepMarker::Completed);
    assert_eq!(wizard.step_marker(4), StepMarker::Active);
    wizard.go_to_step(1).unwrap();
    assert_eq!(wizard.step_marker(2), StepMarker::Pending);

    assert_eq!(wizard.fields(), &before);
    assert!(wizard.go_to_step(0).is_err());
    assert!(wizard.go_to_step(5).is_err());
}

#[test]
fn test_submit_payload() {
    let mut wizard = filled_wizard();
    wizard.fields_mut().set_seeking_collaborators(true);
    wizard.set_field(Field::TeamNeeds, "Someone who can sew and solder");
    wizard.add_tag("Solar");
    wizard.add_tag("students");

    for expected in 2..=4 {
        assert_eq!(wizard.advance(), Advance::Moved(expected));
    }
    assert!(wizard.preview().is_some());
    assert_eq!(wizard.advance(), Advance::ReadyToSubmit);

    let payload = wizard.submit().unwrap();
    assert_eq!(payload.title, "Solar Backpack Charger");
    assert_eq!(payload.category, "Technology");
    assert_eq!(payload.development_stage, "Prototype");
    assert_eq!(payload.tags, "solar,students");
    assert_eq!(payload.open_collaboration.as_deref(), Some("on"));
    assert_eq!(payload.team_needs, "Someone who can sew and solder");
    assert_eq!(payload.inspiration, "");

    assert!(wizard.is_submitting());
    assert!(wizard.submit().is_err());
    wizard.finish_submit(&Err("network down"));
    assert!(!wizard.is_submitting());
    assert_eq!(wizard.fields().get(Field::Title), "Solar Backpack Charger");
}

#[test]
fn test_submit_sends_user_back_to_first_invalid_step() {
    let mut wizard = filled_wizard();
    wizard.go_to_step(4).unwrap();
    wizard.set_field(Field::SolutionDescription, "too short");

    assert!(wizard.submit().is_err());
    assert_eq!(wizard.errors().first_failing_step(), Some(2));
    assert!(!wizard.is_submitting());
}

#[test]
fn test_keyboard_walkthrough_reaches_submit() {
    let mut model = Model::new(Config::default());

    update(&mut model, ctrl('n'));
    assert_eq!(model.wizard.current_step(), 1);
    let notification = model.notification.clone().unwrap();
    assert_eq!(notification.level, NotificationLevel::Error);

    // Title has focus after the blocked advance.
    type_text(&mut model, "Solar Backpack Charger");
    update(&mut model, key(KeyCode::Tab));
    update(&mut model, key(KeyCode::Right));
    update(&mut model, key(KeyCode::Tab));
    update(&mut model, key(KeyCode::Right));
    update(&mut model, ctrl('n'));
    assert_eq!(model.wizard.current_step(), 2);

    model
        .wizard
        .set_field(Field::ProblemStatement, "p".repeat(60));
    model
        .wizard
        .set_field(Field::SolutionDescription, "s".repeat(60));
    update(&mut model, key(KeyCode::PageDown));
    assert_eq!(model.wizard.current_step(), 3);
    update(&mut model, key(KeyCode::PageDown));
    assert_eq!(model.wizard.current_step(), 4);

    let cmds = update(&mut model, key(KeyCode::Enter));
    let payload = match cmds.as_slice() {
        [Command::SubmitIdea(payload)] => payload.clone(),
        other => panic!("expected SubmitIdea, got {:?}", other),
    };
    assert_eq!(payload.title, "Solar Backpack Charger");
    assert!(!payload.category.is_empty());

    // A second Enter while the request is in flight does nothing.
    assert!(update(&mut model, key(KeyCode::Enter)).is_empty());

    update(&mut model, Message::IdeaSubmitted);
    assert_eq!(model.wizard.current_step(), 1);
    assert_eq!(model.wizard.fields().get(Field::Title), "");
}
