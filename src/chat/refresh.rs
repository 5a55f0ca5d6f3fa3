//! One fetch-and-report cycle, shared by the poll timer and by sends.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::util::with_timeout;
use crate::{hlog_trace, hlog_warn};

use super::{ChatEvent, ChatTransport, Epoch, RefreshToken, TeamId};

/// Monotonic source of [`RefreshToken`]s, shared by all refreshes of a session.
#[derive(Debug, Clone, Default)]
pub struct TokenSource(Arc<AtomicU64>);

impl TokenSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> RefreshToken {
        RefreshToken(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Everything needed to fetch one team's snapshot and report it.
#[derive(Clone)]
pub struct Refresher {
    transport: Arc<dyn ChatTransport>,
    team_id: TeamId,
    epoch: Epoch,
    tokens: TokenSource,
    events: mpsc::UnboundedSender<ChatEvent>,
    timeout: Duration,
}

impl Refresher {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        team_id: TeamId,
        epoch: Epoch,
        tokens: TokenSource,
        events: mpsc::UnboundedSender<ChatEvent>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            team_id,
            epoch,
            tokens,
            events,
            timeout,
        }
    }

    pub fn team_id(&self) -> TeamId {
        self.team_id
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Nobody is listening any more.
    pub fn is_orphaned(&self) -> bool {
        self.events.is_closed()
    }

    pub(crate) fn emit(&self, event: ChatEvent) {
        let _ = self.events.send(event);
    }

    /// Fetch in the background. Cancelling `cancel` drops the request and
    /// suppresses its event.
    pub fn spawn(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let this = self.clone();
        let token = self.tokens.next();
        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                r = with_timeout(this.timeout, this.transport.fetch_messages(this.team_id)) => r,
            };
            if cancel.is_cancelled() {
                return;
            }
            match result {
                Ok(messages) => {
                    hlog_trace!(
                        "Chat refresh team={} token={} messages={}",
                        this.team_id,
                        token.0,
                        messages.len()
                    );
                    this.emit(ChatEvent::Snapshot {
                        epoch: this.epoch,
                        token,
                        messages,
                    });
                }
                Err(e) => {
                    hlog_warn!("Chat refresh failed team={}: {}", this.team_id, e);
                    this.emit(ChatEvent::FetchFailed {
                        epoch: this.epoch,
                        error: e.to_string(),
                    });
                }
            }
        })
    }
}
