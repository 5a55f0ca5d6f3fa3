//! Messages for the TEA (The Elm Architecture) pattern.
//!
//! Messages are inputs to the update function - they come from external sources
//! like keyboard events, the chat session, or command completion callbacks.

use crossterm::event::KeyEvent;

use crate::chat::ChatEvent;

/// Input messages to the update function.
#[derive(Debug)]
pub enum Message {
    // Keyboard/terminal events
    Key(KeyEvent),
    Resize(u16, u16),

    // From the chat session
    Chat(ChatEvent),
    ChatOpenFailed(String),
    ChatSendRejected(String),

    // Command completion callbacks
    IdeaSubmitted,
    /// `retryable` is set for transport failures (network, server, bad response).
    IdeaSubmitFailed { error: String, retryable: bool },
}
