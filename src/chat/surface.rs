//! Render-side chat state.
//!
//! Only [`ChatSurface::apply`] mutates the message list, and it refuses
//! events from any epoch other than the one currently shown.

use super::{ChatEvent, ChatMessage, Epoch, RefreshOrdering, RefreshToken, TeamId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Visible state changed.
    Rendered,
    /// Event belonged to another epoch or was a stale snapshot.
    Ignored,
    /// Something went wrong; show this to the user.
    Notice(String),
    /// A send succeeded and the input was cleared.
    InputCleared,
}

#[derive(Debug, Clone, Default)]
pub struct OpenSurface {
    pub epoch: Epoch,
    pub team_id: Option<TeamId>,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub latest: Option<RefreshToken>,
    pub input: String,
    /// Number of snapshots drawn since open.
    pub renders: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ChatSurface {
    ordering: RefreshOrdering,
    username: String,
    open: Option<OpenSurface>,
}

impl ChatSurface {
    pub fn new(ordering: RefreshOrdering, username: impl Into<String>) -> Self {
        Self {
            ordering,
            username: username.into(),
            open: None,
        }
    }

    pub fn ordering(&self) -> RefreshOrdering {
        self.ordering
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn current(&self) -> Option<&OpenSurface> {
        self.open.as_ref()
    }

    pub fn input_mut(&mut self) -> Option<&mut String> {
        self.open.as_mut().map(|o| &mut o.input)
    }

    pub fn input(&self) -> &str {
        self.open.as_ref().map(|o| o.input.as_str()).unwrap_or("")
    }

    pub fn is_own(&self, message: &ChatMessage) -> bool {
        !self.username.is_empty() && message.author == self.username
    }

    /// Hide the surface without waiting for the session's `Closed` event.
    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn apply(&mut self, event: ChatEvent) -> Applied {
        if let ChatEvent::Opened {
            epoch,
            team_id,
            title,
        } = event
        {
            self.open = Some(OpenSurface {
                epoch,
                team_id: Some(team_id),
                title,
                ..OpenSurface::default()
            });
            return Applied::Rendered;
        }

        let ordering = self.ordering;
        let Some(open) = self.open.as_mut() else {
            return Applied::Ignored;
        };
        if event.epoch() != open.epoch {
            return Applied::Ignored;
        }

        match event {
            ChatEvent::Opened { .. } => Applied::Ignored,
            ChatEvent::Retitled { title, .. } => {
                open.title = title;
                Applied::Rendered
            }
            ChatEvent::Snapshot {
                token, messages, ..
            } => {
                if ordering == RefreshOrdering::Sequenced
                    && open.latest.is_some_and(|latest| token < latest)
                {
                    return Applied::Ignored;
                }
                open.messages = messages;
                open.latest = Some(token);
                open.renders += 1;
                Applied::Rendered
            }
            ChatEvent::FetchFailed { error, .. } => {
                Applied::Notice(format!("Could not load messages: {}", error))
            }
            ChatEvent::Sent { .. } => {
                open.input.clear();
                Applied::InputCleared
            }
            ChatEvent::SendFailed { error, .. } => {
                Applied::Notice(format!("Failed to send message: {}", error))
            }
            ChatEvent::Closed { .. } => {
                self.open = None;
                Applied::Rendered
            }
        }
    }
}
