//! Team chat over a polling transport.
//!
//! [`ChatSession`] owns the timer and issues requests; [`ChatSurface`] is the
//! render-side state fed by the [`ChatEvent`]s the session emits. The two are
//! only connected through an mpsc channel, so a closed surface can never be
//! written to by a late response.

pub mod refresh;
pub mod session;
pub mod surface;
pub mod transport;

use serde::{Deserialize, Serialize};

pub use refresh::{Refresher, TokenSource};
pub use session::ChatSession;
pub use surface::{Applied, ChatSurface, OpenSurface};
pub use transport::ChatTransport;

/// Generation number of an opened chat. Bumped on every `Closed → Open`.
pub type Epoch = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u64);

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TeamId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// One chat line. The backend names the fields `username` and `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "username", alias = "author")]
    pub author: String,
    #[serde(rename = "message", alias = "text")]
    pub text: String,
    #[serde(default)]
    pub timestamp: String,
}

/// Issue order of a fetch. Larger tokens were issued later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshToken(pub u64);

/// How the surface treats snapshots that complete out of issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOrdering {
    /// Drop snapshots issued before the newest one already shown.
    #[default]
    Sequenced,
    /// Show whichever snapshot completed last, even if it is older.
    LastCompleted,
}

/// Everything a session reports back to the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Opened {
        epoch: Epoch,
        team_id: TeamId,
        title: String,
    },
    Retitled {
        epoch: Epoch,
        title: String,
    },
    Snapshot {
        epoch: Epoch,
        token: RefreshToken,
        messages: Vec<ChatMessage>,
    },
    FetchFailed {
        epoch: Epoch,
        error: String,
    },
    Sent {
        epoch: Epoch,
    },
    SendFailed {
        epoch: Epoch,
        error: String,
    },
    Closed {
        epoch: Epoch,
    },
}

impl ChatEvent {
    pub fn epoch(&self) -> Epoch {
        match self {
            ChatEvent::Opened { epoch, .. }
            | ChatEvent::Retitled { epoch, .. }
            | ChatEvent::Snapshot { epoch, .. }
            | ChatEvent::FetchFailed { epoch, .. }
            | ChatEvent::Sent { epoch }
            | ChatEvent::SendFailed { epoch, .. }
            | ChatEvent::Closed { epoch } => *epoch,
        }
    }
}
