//! Poll actor: re-fetches the open team's messages on a fixed interval.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::chat::Refresher;
use crate::{hlog_debug, hlog_trace};

use super::ActorHandle;

pub const POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Fires one refresh immediately and then one per interval, unconditionally.
///
/// A tick does not wait for the previous fetch, matching a plain
/// `setInterval`; each fetch runs under a child of the actor's token.
pub struct ChatPollActor {
    refresher: Refresher,
    interval: Duration,
}

impl ChatPollActor {
    pub fn new(refresher: Refresher) -> Self {
        Self {
            refresher,
            interval: POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn spawn(self) -> ActorHandle {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        hlog_debug!(
            "ChatPollActor::spawn team={} epoch={} interval={:?}",
            self.refresher.team_id(),
            self.refresher.epoch(),
            self.interval
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel_clone.cancelled() => {
                        hlog_debug!("ChatPollActor cancelled team={}", self.refresher.team_id());
                        break;
                    }
                    _ = interval.tick() => {
                        if self.refresher.is_orphaned() {
                            hlog_debug!("ChatPollActor: event channel closed");
                            break;
                        }
                        hlog_trace!("ChatPollActor tick team={}", self.refresher.team_id());
                        self.refresher.spawn(cancel_clone.child_token());
                    }
                }
            }
        });

        ActorHandle::new(cancel)
    }
}
