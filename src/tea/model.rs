//! Model for the TEA (The Elm Architecture) pattern.
//!
//! The Model is pure application state - no channels, no handles, no runtime infrastructure.
//! The chat session itself lives in the logic thread; the model only holds
//! its render-side [`ChatSurface`].

use crate::chat::{ChatSurface, TeamId};
use crate::config::Config;
use crate::render::{ChatLine, ChatView, FieldView, RenderState, WizardView};
use crate::wizard::{CharCounter, Field, WizardState};

/// Level of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Error notification - displayed in red with "Error:" prefix
    Error,
    /// Informational notification - displayed in green
    Info,
}

/// A notification message to display to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Wizard,
    Chat,
}

/// What keyboard input in the wizard currently edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(Field),
    Tags,
    Collaborators,
}

impl Focus {
    /// Focus order of a step. Team needs only exist while collaborating.
    pub fn slots(step: usize, seeking_collaborators: bool) -> Vec<Focus> {
        match step {
            1 => vec![
                Focus::Field(Field::Title),
                Focus::Field(Field::Category),
                Focus::Field(Field::Stage),
            ],
            2 => vec![
                Focus::Field(Field::ProblemStatement),
                Focus::Field(Field::SolutionDescription),
            ],
            3 => {
                let mut slots = vec![
                    Focus::Field(Field::TargetMarket),
                    Focus::Field(Field::BudgetRange),
                    Focus::Field(Field::Timeline),
                    Focus::Tags,
                    Focus::Collaborators,
                ];
                if seeking_collaborators {
                    slots.push(Focus::Field(Field::TeamNeeds));
                }
                slots.push(Focus::Field(Field::Inspiration));
                slots
            }
            _ => Vec::new(),
        }
    }
}

/// Pure application state - the single source of truth.
pub struct Model {
    pub screen: Screen,

    // Wizard
    pub wizard: WizardState,
    pub focus: usize,
    pub tag_input: String,

    // Chat
    pub chat: ChatSurface,
    /// Team to (re)open on this screen.
    pub chat_target: Option<(TeamId, String)>,

    pub notification: Option<Notification>,

    // Dirty flag - set when state changes and render is needed
    pub dirty: bool,

    // Config (immutable after init)
    pub config: Config,
}

impl Model {
    pub fn new(config: Config) -> Self {
        let wizard = WizardState::new(config.validation.clone());
        let chat = ChatSurface::new(config.chat.ordering, config.effective_username());
        Self {
            screen: Screen::Wizard,
            wizard,
            focus: 0,
            tag_input: String::new(),
            chat,
            chat_target: None,
            notification: None,
            dirty: true,
            config,
        }
    }

    /// Start on the chat screen for `team_id`.
    pub fn for_chat(config: Config, team_id: TeamId, title: impl Into<String>) -> Self {
        let mut model = Self::new(config);
        model.screen = Screen::Chat;
        model.chat_target = Some((team_id, title.into()));
        model
    }

    pub fn focus_slots(&self) -> Vec<Focus> {
        Focus::slots(
            self.wizard.current_step(),
            self.wizard.fields().seeking_collaborators(),
        )
    }

    pub fn focused(&self) -> Option<Focus> {
        self.focus_slots().get(self.focus).copied()
    }

    /// Create an immutable snapshot for the render thread.
    pub fn snapshot(&self) -> RenderState {
        RenderState {
            version: crate::render::next_version(),
            screen: self.screen,
            wizard: self.wizard_view(),
            chat: self.chat_view(),
            chat_target: self.chat_target.as_ref().map(|(_, title)| title.clone()),
            notification: self.notification.clone(),
        }
    }

    fn wizard_view(&self) -> WizardView {
        let wizard = &self.wizard;
        let focused = self.focused();
        let rules = wizard.rules();

        let fields = self
            .focus_slots()
            .into_iter()
            .filter_map(|slot| match slot {
                Focus::Field(field) => Some(field),
                _ => None,
            })
            .map(|field| {
                let value = wizard.fields().get(field).to_string();
                FieldView {
                    field,
                    label: field.label(),
                    counter: field.max_len(rules).map(|max| CharCounter::new(&value, max)),
                    value,
                    error: wizard.errors().message(field).map(str::to_string),
                    focused: focused == Some(Focus::Field(field)),
                    is_choice: field.is_choice(),
                }
            })
            .collect();

        WizardView {
            current_step: wizard.current_step(),
            total_steps: wizard.total_steps(),
            markers: (1..=wizard.total_steps())
                .map(|s| wizard.step_marker(s))
                .collect(),
            fields,
            tags: wizard.tags().as_slice().to_vec(),
            tag_input: self.tag_input.clone(),
            tags_focused: focused == Some(Focus::Tags),
            show_tags: wizard.current_step() == 3,
            seeking_collaborators: wizard.fields().seeking_collaborators(),
            collaborators_focused: focused == Some(Focus::Collaborators),
            preview: wizard.preview(),
            submitting: wizard.is_submitting(),
        }
    }

    fn chat_view(&self) -> Option<ChatView> {
        let open = self.chat.current()?;
        Some(ChatView {
            title: open.title.clone(),
            messages: open
                .messages
                .iter()
                .map(|m| ChatLine {
                    author: m.author.clone(),
                    text: m.text.clone(),
                    timestamp: m.timestamp.clone(),
                    own: self.chat.is_own(m),
                })
                .collect(),
            input: open.input.clone(),
        })
    }
}
