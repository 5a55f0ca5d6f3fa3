//! Commands for the TEA (The Elm Architecture) pattern.
//!
//! Commands are outputs from the update function - they represent side effects
//! to be executed by the runtime.

use crate::chat::TeamId;
use crate::wizard::IdeaSubmission;

/// Output commands from the update function.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    SubmitIdea(IdeaSubmission),

    // Chat session
    OpenChat { team_id: TeamId, title: String },
    CloseChat,
    SendChat(String),

    // App lifecycle
    Quit,
}
