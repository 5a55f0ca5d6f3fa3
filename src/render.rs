use std::sync::atomic::{AtomicU64, Ordering};

use crate::tea::{Notification, Screen};
use crate::wizard::{CharCounter, Field, Preview, StepMarker};

/// One input of the current wizard step.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub field: Field,
    pub label: &'static str,
    pub value: String,
    pub counter: Option<CharCounter>,
    pub error: Option<String>,
    pub focused: bool,
    pub is_choice: bool,
}

#[derive(Debug, Clone, Default)]
pub struct WizardView {
    pub current_step: usize,
    pub total_steps: usize,
    pub markers: Vec<StepMarker>,
    pub fields: Vec<FieldView>,
    pub tags: Vec<String>,
    pub tag_input: String,
    pub tags_focused: bool,
    pub show_tags: bool,
    pub seeking_collaborators: bool,
    pub collaborators_focused: bool,
    /// Only on the final step.
    pub preview: Option<Preview>,
    pub submitting: bool,
}

#[derive(Debug, Clone)]
pub struct ChatLine {
    pub author: String,
    pub text: String,
    pub timestamp: String,
    pub own: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ChatView {
    pub title: String,
    pub messages: Vec<ChatLine>,
    pub input: String,
}

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub version: u64,
    pub screen: Screen,
    pub wizard: WizardView,
    /// `None` while the chat is closed.
    pub chat: Option<ChatView>,
    /// Title of the team the chat screen reopens.
    pub chat_target: Option<String>,
    pub notification: Option<Notification>,
}
