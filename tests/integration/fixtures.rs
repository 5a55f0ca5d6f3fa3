//! Test fixtures for integration tests.
//!
//! Provides a scripted [`ChatTransport`] and helpers for building sessions
//! and filling in the wizard.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use ideahub::chat::{ChatEvent, ChatMessage, ChatSession, ChatSurface, ChatTransport, TeamId};
use ideahub::wizard::{Field, WizardState};
use ideahub::{Error, Result};

pub const USER: &str = "maya";

pub fn msg(author: &str, text: &str) -> ChatMessage {
    ChatMessage {
        author: author.to_string(),
        text: text.to_string(),
        timestamp: "2024-05-01 10:00:00".to_string(),
    }
}

/// In-memory backend.
///
/// A fetch copies the message list when it is *issued*, then waits for its
/// scripted delay, so a slow fetch returns a stale view.
#[derive(Default)]
pub struct FakeTransport {
    messages: Mutex<Vec<ChatMessage>>,
    fetch_delays: Mutex<VecDeque<Duration>>,
    post_delay: Mutex<Duration>,
    fetches: AtomicUsize,
    posts: Mutex<Vec<(TeamId, String)>>,
    fail_fetch: AtomicBool,
    fail_post: AtomicBool,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_messages(messages: Vec<ChatMessage>) -> Arc<Self> {
        let t = Self::default();
        *t.messages.lock().unwrap() = messages;
        Arc::new(t)
    }

    /// Delay of the next fetch; later fetches without a script complete at once.
    pub fn delay_next_fetch(&self, delay: Duration) {
        self.fetch_delays.lock().unwrap().push_back(delay);
    }

    pub fn set_post_delay(&self, delay: Duration) {
        *self.post_delay.lock().unwrap() = delay;
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_post(&self, fail: bool) {
        self.fail_post.store(fail, Ordering::SeqCst);
    }

    pub fn push(&self, message: ChatMessage) {
        self.messages.lock().unwrap().push(message);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn posts(&self) -> Vec<(TeamId, String)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn fetch_messages(&self, _team_id: TeamId) -> Result<Vec<ChatMessage>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.messages.lock().unwrap().clone();
        let delay = self.fetch_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(Error::Api {
                status: 500,
                body: "Internal Server Error".to_string(),
            });
        }
        Ok(snapshot)
    }

    async fn post_message(&self, team_id: TeamId, text: &str) -> Result<()> {
        let delay = *self.post_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_post.load(Ordering::SeqCst) {
            return Err(Error::Api {
                status: 403,
                body: "Not a team member".to_string(),
            });
        }
        self.posts.lock().unwrap().push((team_id, text.to_string()));
        self.push(msg(USER, text));
        Ok(())
    }
}

pub fn session(
    transport: Arc<FakeTransport>,
    interval: Duration,
) -> (ChatSession, mpsc::UnboundedReceiver<ChatEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChatSession::new(transport, tx, interval), rx)
}

/// Apply everything queued so far; returns the events seen.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<ChatEvent>, surface: &mut ChatSurface) -> Vec<ChatEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        surface.apply(event.clone());
        seen.push(event);
    }
    seen
}

pub fn texts(surface: &ChatSurface) -> Vec<String> {
    surface
        .current()
        .map(|open| open.messages.iter().map(|m| m.text.clone()).collect())
        .unwrap_or_default()
}

/// A wizard with every required field of every step filled in validly.
pub fn filled_wizard() -> WizardState {
    let mut wizard = WizardState::default();
    wizard.set_field(Field::Title, "Solar Backpack Charger");
    wizard.set_field(Field::Category, "Technology");
    wizard.set_field(Field::Stage, "Prototype");
    wizard.set_field(
        Field::ProblemStatement,
        "Students walk between classes all day and their phones die before the last bell rings.",
    );
    wizard.set_field(
        Field::SolutionDescription,
        "A thin solar panel stitched into a backpack flap that trickle-charges a small battery pack.",
    );
    wizard.set_field(Field::TargetMarket, "High school and college students");
    wizard.set_field(Field::BudgetRange, "$100-$500");
    wizard.set_field(Field::Timeline, "3 months");
    wizard
}
