use thiserror::Error;

use crate::chat::TeamId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Step {step} is out of range 1..={total}")]
    InvalidStep { step: usize, total: usize },

    #[error("Tag index {index} is out of range (have {len})")]
    TagIndex { index: usize, len: usize },

    #[error("No chat channel is open")]
    ChatClosed,

    #[error("Chat already open on team {open}, cannot open team {requested}")]
    ChannelBusy { open: TeamId, requested: TeamId },

    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Task join error: {0}")]
    TaskJoin(String),
}

impl Error {
    /// Transport-class failures: the user may retry the same action.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Api { .. } | Error::Json(_) | Error::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
