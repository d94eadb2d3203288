/// Error types for configuration, API access and polling
use thiserror::Error;

use crate::sync::scheduler::SessionToken;

/// Any failure to obtain a usable response from the dashboard API
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Outcome of applying a poll response to the local state
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The response belongs to a session that was stopped or replaced.
    #[error("stale response for session {0}")]
    StaleResponse(SessionToken),

    /// A later request of the same session has already been applied.
    #[error("response #{seq} of session {session} superseded by #{newest}")]
    Superseded {
        session: SessionToken,
        seq: u64,
        newest: u64,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidVar { key: String, value: String },

    #[error("{0} must be greater than zero")]
    Zero(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("missing argument for '{0}'")]
    MissingArgument(String),

    #[error("invalid argument '{value}' for '{command}'")]
    InvalidArgument { command: String, value: String },
}
