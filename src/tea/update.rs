//! Pure update function for the TEA (The Elm Architecture) pattern.
//!
//! The update function takes a model and a message, mutates the model,
//! and returns a list of commands to execute.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::chat::Applied;
use crate::wizard::{Advance, Field, MAX_TAGS};
use crate::{hlog, hlog_debug, hlog_warn};

use super::command::Command;
use super::message::Message;
use super::model::{Focus, Model, Notification, Screen};

/// Helper to set an error notification and mark model as dirty.
fn set_error(model: &mut Model, message: String) {
    hlog_warn!("UI Error: {}", message);
    model.notification = Some(Notification::error(message));
    model.dirty = true;
}

fn set_info(model: &mut Model, message: impl Into<String>) {
    model.notification = Some(Notification::info(message));
    model.dirty = true;
}

/// Pure update function: Model + Message → Commands
///
/// The function itself has no side effects - all I/O happens via returned Commands.
pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::Key(key) => {
            model.notification = None; // Clear notification on any key press
            model.dirty = true;
            if is_ctrl(&key, 'c') || is_ctrl(&key, 'q') {
                cmds.push(Command::Quit);
                return cmds;
            }
            match model.screen {
                Screen::Wizard => update_wizard(model, key, &mut cmds),
                Screen::Chat => update_chat(model, key, &mut cmds),
            }
        }

        Message::Resize(_, _) => {
            model.dirty = true;
        }

        Message::Chat(event) => match model.chat.apply(event) {
            Applied::Rendered | Applied::InputCleared => model.dirty = true,
            Applied::Notice(notice) => set_error(model, notice),
            Applied::Ignored => {}
        },

        Message::ChatOpenFailed(err) => {
            hlog_warn!("Message::ChatOpenFailed err={}", err);
            set_error(model, format!("Cannot open chat: {}", err));
        }

        Message::ChatSendRejected(err) => {
            set_error(model, err);
        }

        Message::IdeaSubmitted => {
            hlog!("Message::IdeaSubmitted");
            model.wizard.finish_submit(&Ok::<(), String>(()));
            model.tag_input.clear();
            model.focus = 0;
            set_info(model, "Idea submitted successfully!");
        }

        Message::IdeaSubmitFailed { error, retryable } => {
            hlog_warn!("Message::IdeaSubmitFailed err={} retryable={}", error, retryable);
            model.wizard.finish_submit(&Err(error.as_str()));
            let message = if retryable {
                format!("Failed to submit idea: {}. Please try again.", error)
            } else {
                format!("Failed to submit idea: {}", error)
            };
            set_error(model, message);
        }
    }

    cmds
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

fn update_wizard(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    if is_ctrl(&key, 'n') || key.code == KeyCode::PageDown {
        forward(model, cmds);
        return;
    }
    if is_ctrl(&key, 'p') || key.code == KeyCode::PageUp {
        commit_pending_tag(model);
        if model.wizard.retreat() {
            model.focus = 0;
        }
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return;
    }

    match key.code {
        KeyCode::F(n) => {
            commit_pending_tag(model);
            if let Err(e) = model.wizard.go_to_step(n as usize) {
                set_error(model, e.to_string());
            } else {
                model.focus = 0;
            }
        }

        KeyCode::Esc => cmds.push(Command::Quit),

        KeyCode::Tab | KeyCode::Down => cycle_focus(model, true),
        KeyCode::BackTab | KeyCode::Up => cycle_focus(model, false),

        _ => match model.focused() {
            Some(Focus::Field(field)) => edit_field(model, field, key),
            Some(Focus::Tags) => edit_tags(model, key),
            Some(Focus::Collaborators) => {
                if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
                    let fields = model.wizard.fields_mut();
                    let seeking = !fields.seeking_collaborators();
                    fields.set_seeking_collaborators(seeking);
                }
            }
            None => {
                if key.code == KeyCode::Enter {
                    forward(model, cmds);
                }
            }
        },
    }
}

/// The forward button: next step, or submit on the last one.
fn forward(model: &mut Model, cmds: &mut Vec<Command>) {
    if model.wizard.is_submitting() {
        return;
    }
    commit_pending_tag(model);
    match model.wizard.advance() {
        Advance::Moved(step) => {
            hlog_debug!("Wizard moved to step {}", step);
            model.focus = 0;
        }
        Advance::Blocked(result) => {
            if let Some(first) = result.messages().keys().next().copied() {
                focus_field(model, first);
            }
            set_error(model, "Please fix the highlighted fields".to_string());
        }
        Advance::ReadyToSubmit => match model.wizard.submit() {
            Ok(payload) => {
                set_info(model, "Submitting...");
                cmds.push(Command::SubmitIdea(payload));
            }
            Err(e) => {
                if let Some(step) = model.wizard.errors().first_failing_step() {
                    let _ = model.wizard.go_to_step(step);
                    model.focus = 0;
                }
                set_error(model, e.to_string());
            }
        },
    }
}

fn focus_field(model: &mut Model, field: Field) {
    if let Some(index) = model
        .focus_slots()
        .iter()
        .position(|slot| *slot == Focus::Field(field))
    {
        model.focus = index;
    }
}

fn cycle_focus(model: &mut Model, forward: bool) {
    let len = model.focus_slots().len();
    if len == 0 {
        return;
    }
    if model.focused() == Some(Focus::Tags) {
        commit_pending_tag(model);
    }
    model.focus = if forward {
        (model.focus + 1) % len
    } else {
        model.focus.checked_sub(1).unwrap_or(len - 1)
    };
}

fn edit_field(model: &mut Model, field: Field, key: KeyEvent) {
    if field.is_choice() {
        let options = match field {
            Field::Category => model.wizard.rules().categories.clone(),
            _ => model.wizard.rules().stages.clone(),
        };
        let step: isize = match key.code {
            KeyCode::Right | KeyCode::Char(' ') => 1,
            KeyCode::Left => -1,
            KeyCode::Backspace | KeyCode::Delete => {
                model.wizard.set_field(field, "");
                return;
            }
            _ => return,
        };
        let next = cycle_choice(&options, model.wizard.fields().get(field), step);
        model.wizard.set_field(field, next);
        return;
    }

    match key.code {
        KeyCode::Enter => cycle_focus(model, true),
        KeyCode::Backspace => model.wizard.fields_mut().pop_char(field),
        KeyCode::Char(c) => model.wizard.fields_mut().push_char(field, c),
        _ => {}
    }
}

/// Next option after `current`; an unset value starts at either end.
fn cycle_choice(options: &[String], current: &str, step: isize) -> String {
    if options.is_empty() {
        return String::new();
    }
    let len = options.len() as isize;
    let next = match options.iter().position(|o| o == current) {
        Some(i) => (i as isize + step).rem_euclid(len),
        None if step >= 0 => 0,
        None => len - 1,
    };
    options[next as usize].clone()
}

/// Turn whatever is typed in the tag input into a tag. Runs on Enter or `,`
/// and whenever focus leaves the tag input, so typed text is never lost.
fn commit_pending_tag(model: &mut Model) {
    let text = std::mem::take(&mut model.tag_input);
    if text.trim().is_empty() || model.wizard.add_tag(&text) {
        return;
    }
    if model.wizard.tags().is_full() {
        set_error(model, format!("You can add at most {} tags", MAX_TAGS));
    } else {
        set_info(model, "Tag already added");
    }
}

fn edit_tags(model: &mut Model, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(',') => commit_pending_tag(model),
        KeyCode::Backspace => {
            if model.tag_input.is_empty() {
                let len = model.wizard.tags().len();
                if len > 0 {
                    let _ = model.wizard.remove_tag(len - 1);
                }
            } else {
                model.tag_input.pop();
            }
        }
        KeyCode::Char(c) => model.tag_input.push(c),
        _ => {}
    }
}

fn update_chat(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    if !model.chat.is_open() {
        match key.code {
            KeyCode::Char('o') | KeyCode::Enter => {
                if let Some((team_id, title)) = model.chat_target.clone() {
                    cmds.push(Command::OpenChat { team_id, title });
                }
            }
            KeyCode::Char('q') | KeyCode::Esc => cmds.push(Command::Quit),
            _ => {}
        }
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return;
    }

    match key.code {
        KeyCode::Esc => {
            model.chat.close();
            cmds.push(Command::CloseChat);
        }
        KeyCode::Enter => {
            let text = model.chat.input().trim().to_string();
            if !text.is_empty() {
                cmds.push(Command::SendChat(text));
            }
        }
        KeyCode::Backspace => {
            if let Some(input) = model.chat.input_mut() {
                input.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(input) = model.chat.input_mut() {
                input.push(c);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatEvent, TeamId};
    use crate::config::Config;
    use crate::tea::NotificationLevel;

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

    fn fill_step_one(model: &mut Model) {
        type_text(model, "A Great Idea");
        update(model, key(KeyCode::Tab));
        update(model, key(KeyCode::Right));
        update(model, key(KeyCode::Tab));
        update(model, key(KeyCode::Right));
    }

    #[test]
    fn test_typing_edits_focused_field() {
        let mut model = Model::new(Config::default());
        type_text(&mut model, "Solar");
        update(&mut model, key(KeyCode::Backspace));
        assert_eq!(model.wizard.fields().get(Field::Title), "Sola");
    }

    #[test]
    fn test_choice_cycles_through_configured_options() {
        let mut model = Model::new(Config::default());
        update(&mut model, key(KeyCode::Tab));
        update(&mut model, key(KeyCode::Right));
        assert_eq!(model.wizard.fields().get(Field::Category), "Technology");
        update(&mut model, key(KeyCode::Left));
        update(&mut model, key(KeyCode::Left));
        assert_eq!(model.wizard.fields().get(Field::Category), "Sports");
    }

    #[test]
    fn test_blocked_advance_focuses_first_error() {
        let mut model = Model::new(Config::default());
        update(&mut model, key(KeyCode::Tab));
        update(&mut model, key(KeyCode::Tab));
        let cmds = update(&mut model, ctrl('n'));
        assert!(cmds.is_empty());
        assert_eq!(model.wizard.current_step(), 1);
        assert_eq!(model.focused(), Some(Focus::Field(Field::Title)));
        assert_eq!(
            model.notification.as_ref().map(|n| n.level),
            Some(NotificationLevel::Error)
        );
    }

    #[test]
    fn test_valid_step_advances_and_back_keeps_data() {
        let mut model = Model::new(Config::default());
        fill_step_one(&mut model);
        update(&mut model, ctrl('n'));
        assert_eq!(model.wizard.current_step(), 2);
        update(&mut model, ctrl('p'));
        assert_eq!(model.wizard.current_step(), 1);
        assert_eq!(model.wizard.fields().get(Field::Title), "A Great Idea");
    }

    #[test]
    fn test_tag_entry_and_backspace_removal() {
        let mut model = Model::new(Config::default());
        model.wizard.go_to_step(3).unwrap();
        for _ in 0..3 {
            update(&mut model, key(KeyCode::Tab));
        }
        assert_eq!(model.focused(), Some(Focus::Tags));
        type_text(&mut model, "AI,");
        type_text(&mut model, "Green");
        update(&mut model, key(KeyCode::Enter));
        assert_eq!(model.wizard.tags().as_slice(), &["ai", "green"]);

        update(&mut model, key(KeyCode::Backspace));
        assert_eq!(model.wizard.tags().as_slice(), &["ai"]);
    }

    #[test]
    fn test_collaborator_toggle_reveals_team_needs() {
        let mut model = Model::new(Config::default());
        model.wizard.go_to_step(3).unwrap();
        model.focus = 4;
        assert_eq!(model.focused(), Some(Focus::Collaborators));
        update(&mut model, key(KeyCode::Char(' ')));
        assert!(model.wizard.fields().seeking_collaborators());
        assert!(model.focus_slots().contains(&Focus::Field(Field::TeamNeeds)));
    }

    #[test]
    fn test_submit_on_final_step_emits_command_and_locks() {
        let mut model = Model::new(Config::default());
        model.wizard.set_field(Field::Title, "A Great Idea");
        model.wizard.set_field(Field::Category, "Technology");
        model.wizard.set_field(Field::Stage, "Idea");
        model.wizard.set_field(Field::ProblemStatement, "p".repeat(60));
        model.wizard.set_field(Field::SolutionDescription, "s".repeat(60));
        model.wizard.go_to_step(4).unwrap();

        let cmds = update(&mut model, ctrl('n'));
        assert!(matches!(cmds.as_slice(), [Command::SubmitIdea(p)] if p.title == "A Great Idea"));
        assert!(model.wizard.is_submitting());
        assert!(update(&mut model, ctrl('n')).is_empty());

        update(
            &mut model,
            Message::IdeaSubmitFailed {
                error: "offline".to_string(),
                retryable: true,
            },
        );
        assert!(!model.wizard.is_submitting());
        assert_eq!(model.wizard.fields().get(Field::Title), "A Great Idea");
    }

    #[test]
    fn test_pending_tag_kept_when_focus_leaves() {
        let mut model = Model::new(Config::default());
        model.wizard.go_to_step(3).unwrap();
        for _ in 0..3 {
            update(&mut model, key(KeyCode::Tab));
        }
        type_text(&mut model, "edtech");
        update(&mut model, key(KeyCode::Tab));
        assert_eq!(model.wizard.tags().as_slice(), &["edtech"]);
        assert!(model.tag_input.is_empty());
    }

    #[test]
    fn test_pending_tag_included_in_submission() {
        let mut model = Model::new(Config::default());
        model.wizard.set_field(Field::Title, "A Great Idea");
        model.wizard.set_field(Field::Category, "Education");
        model.wizard.set_field(Field::Stage, "Idea");
        model.wizard.set_field(Field::ProblemStatement, "p".repeat(60));
        model.wizard.set_field(Field::SolutionDescription, "s".repeat(60));
        model.wizard.go_to_step(3).unwrap();
        for _ in 0..3 {
            update(&mut model, key(KeyCode::Tab));
        }
        type_text(&mut model, "edtech");

        update(&mut model, ctrl('n'));
        assert_eq!(model.wizard.current_step(), 4);
        let cmds = update(&mut model, ctrl('n'));
        match cmds.as_slice() {
            [Command::SubmitIdea(payload)] => assert_eq!(payload.tags, "edtech"),
            other => panic!("expected SubmitIdea, got {:?}", other),
        }
    }

    #[test]
    fn test_pending_duplicate_tag_is_dropped_with_notice() {
        let mut model = Model::new(Config::default());
        model.wizard.go_to_step(3).unwrap();
        model.wizard.add_tag("ai");
        model.tag_input = "AI".to_string();
        update(&mut model, ctrl('p'));
        assert_eq!(model.wizard.tags().as_slice(), &["ai"]);
        assert_eq!(
            model.notification.as_ref().map(|n| n.message.as_str()),
            Some("Tag already added")
        );
    }

    #[test]
    fn test_submit_failure_wording_depends_on_retryability() {
        let mut model = Model::new(Config::default());
        update(
            &mut model,
            Message::IdeaSubmitFailed {
                error: "Server returned 503: busy".to_string(),
                retryable: true,
            },
        );
        let message = model.notification.clone().unwrap().message;
        assert!(message.ends_with("Please try again."));

        update(
            &mut model,
            Message::IdeaSubmitFailed {
                error: "Validation error: bad".to_string(),
                retryable: false,
            },
        );
        let message = model.notification.clone().unwrap().message;
        assert_eq!(message, "Failed to submit idea: Validation error: bad");
    }

    #[test]
    fn test_submit_with_invalid_earlier_step_jumps_back() {
        let mut model = Model::new(Config::default());
        model.wizard.go_to_step(4).unwrap();
        let cmds = update(&mut model, ctrl('n'));
        assert!(cmds.is_empty());
        assert_eq!(model.wizard.current_step(), 1);
        assert!(!model.wizard.is_submitting());
    }

    #[test]
    fn test_submitted_resets_form() {
        let mut model = Model::new(Config::default());
        model.wizard.set_field(Field::Title, "Keep?");
        update(&mut model, Message::IdeaSubmitted);
        assert_eq!(model.wizard.fields().get(Field::Title), "");
        assert_eq!(
            model.notification.as_ref().map(|n| n.level),
            Some(NotificationLevel::Info)
        );
    }

    #[test]
    fn test_chat_keys() {
        let mut model = Model::for_chat(Config::default(), TeamId(3), "Team");
        let cmds = update(&mut model, key(KeyCode::Char('o')));
        assert_eq!(
            cmds,
            vec![Command::OpenChat {
                team_id: TeamId(3),
                title: "Team".to_string()
            }]
        );

        update(
            &mut model,
            Message::Chat(ChatEvent::Opened {
                epoch: 1,
                team_id: TeamId(3),
                title: "Team".to_string(),
            }),
        );
        type_text(&mut model, " hi ");
        let cmds = update(&mut model, key(KeyCode::Enter));
        assert_eq!(cmds, vec![Command::SendChat("hi".to_string())]);

        update(&mut model, Message::Chat(ChatEvent::Sent { epoch: 1 }));
        assert_eq!(model.chat.input(), "");

        let cmds = update(&mut model, key(KeyCode::Esc));
        assert_eq!(cmds, vec![Command::CloseChat]);
        assert!(!model.chat.is_open());
    }

    #[test]
    fn test_blank_chat_input_sends_nothing() {
        let mut model = Model::for_chat(Config::default(), TeamId(3), "Team");
        update(
            &mut model,
            Message::Chat(ChatEvent::Opened {
                epoch: 1,
                team_id: TeamId(3),
                title: "Team".to_string(),
            }),
        );
        type_text(&mut model, "   ");
        assert!(update(&mut model, key(KeyCode::Enter)).is_empty());
    }

    #[test]
    fn test_fetch_failure_notifies_but_keeps_chat_open() {
        let mut model = Model::for_chat(Config::default(), TeamId(3), "Team");
        update(
            &mut model,
            Message::Chat(ChatEvent::Opened {
                epoch: 1,
                team_id: TeamId(3),
                title: "Team".to_string(),
            }),
        );
        update(
            &mut model,
            Message::Chat(ChatEvent::FetchFailed {
                epoch: 1,
                error: "503".to_string(),
            }),
        );
        assert!(model.chat.is_open());
        assert!(model.notification.is_some());
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let mut model = Model::new(Config::default());
        assert_eq!(update(&mut model, ctrl('c')), vec![Command::Quit]);
    }

    #[test]
    fn test_cycle_choice_wraps() {
        let options = vec!["a".to_string(), "b".to_string()];
        assert_eq!(cycle_choice(&options, "", 1), "a");
        assert_eq!(cycle_choice(&options, "", -1), "b");
        assert_eq!(cycle_choice(&options, "b", 1), "a");
        assert_eq!(cycle_choice(&[], "x", 1), "");
    }
}
