//! Background actors.
//!
//! Each actor is an independent tokio task stopped through a
//! `CancellationToken`. The only actor is the chat poller; it exists
//! exactly while a chat is open.

pub mod poll;

use tokio_util::sync::CancellationToken;

pub use poll::ChatPollActor;

/// Handle to a running actor, used for shutdown.
///
/// Dropping the handle does not stop the actor; call [`ActorHandle::shutdown`].
pub struct ActorHandle {
    cancel: CancellationToken,
}

impl ActorHandle {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Idempotent.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token for work that must stop together with this actor.
    pub fn child_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }
}
