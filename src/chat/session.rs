//! Chat controller: `Closed → Open → Closed`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::actors::{ActorHandle, ChatPollActor};
use crate::util::with_timeout;
use crate::{hlog_debug, hlog_warn, Error, Result};

use super::refresh::{Refresher, TokenSource};
use super::{ChatEvent, ChatTransport, Epoch, TeamId};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

struct ActiveChannel {
    team_id: TeamId,
    title: String,
    epoch: Epoch,
    poller: ActorHandle,
    refresher: Refresher,
}

/// Owns the poll timer of the open chat. At most one chat is open.
///
/// Must be used from inside a tokio runtime. Dropping the session closes it.
pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    events: mpsc::UnboundedSender<ChatEvent>,
    poll_interval: Duration,
    fetch_timeout: Duration,
    tokens: TokenSource,
    last_epoch: Epoch,
    active: Option<ActiveChannel>,
}

impl ChatSession {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        events: mpsc::UnboundedSender<ChatEvent>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            transport,
            events,
            poll_interval,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            tokens: TokenSource::new(),
            last_epoch: 0,
            active: None,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_team(&self) -> Option<TeamId> {
        self.active.as_ref().map(|a| a.team_id)
    }

    pub fn title(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.title.as_str())
    }

    /// Open a team's chat and start polling.
    ///
    /// Reopening the team that is already open only updates the title.
    pub fn open(&mut self, team_id: TeamId, title: impl Into<String>) -> Result<Epoch> {
        let title = title.into();

        if let Some(active) = self.active.as_mut() {
            if active.team_id != team_id {
                return Err(Error::ChannelBusy {
                    open: active.team_id,
                    requested: team_id,
                });
            }
            hlog_debug!("Chat already open on team={}, retitling", team_id);
            active.title = title.clone();
            let _ = self.events.send(ChatEvent::Retitled {
                epoch: active.epoch,
                title,
            });
            return Ok(active.epoch);
        }

        self.last_epoch += 1;
        let epoch = self.last_epoch;
        hlog_debug!("Chat open team={} epoch={}", team_id, epoch);

        let _ = self.events.send(ChatEvent::Opened {
            epoch,
            team_id,
            title: title.clone(),
        });

        let refresher = Refresher::new(
            self.transport.clone(),
            team_id,
            epoch,
            self.tokens.clone(),
            self.events.clone(),
            self.fetch_timeout,
        );
        let poller = ChatPollActor::new(refresher.clone())
            .with_interval(self.poll_interval)
            .spawn();

        self.active = Some(ActiveChannel {
            team_id,
            title,
            epoch,
            poller,
            refresher,
        });
        Ok(epoch)
    }

    /// Stop polling and drop in-flight fetches. Returns whether a chat was open.
    pub fn close(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        hlog_debug!("Chat close team={} epoch={}", active.team_id, active.epoch);
        active.poller.shutdown();
        let _ = self.events.send(ChatEvent::Closed {
            epoch: active.epoch,
        });
        true
    }

    /// Post a message, then refresh right away instead of waiting for a tick.
    ///
    /// The post itself survives a `close()`; the follow-up refresh does not.
    pub fn send(&self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Validation("Message cannot be empty".to_string()));
        }
        let active = self.active.as_ref().ok_or(Error::ChatClosed)?;

        let transport = self.transport.clone();
        let refresher = active.refresher.clone();
        let cancel = active.poller.child_token();
        let timeout = self.fetch_timeout;
        let team_id = active.team_id;
        let epoch = active.epoch;
        let text = text.to_string();

        tokio::spawn(async move {
            match with_timeout(timeout, transport.post_message(team_id, &text)).await {
                Ok(()) => {
                    hlog_debug!("Chat message sent team={}", team_id);
                    refresher.emit(ChatEvent::Sent { epoch });
                    if !cancel.is_cancelled() {
                        refresher.spawn(cancel);
                    }
                }
                Err(e) => {
                    hlog_warn!("Chat send failed team={}: {}", team_id, e);
                    refresher.emit(ChatEvent::SendFailed {
                        epoch,
                        error: e.to_string(),
                    });
                }
            }
        });
        Ok(())
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.poller.shutdown();
        }
    }
}
