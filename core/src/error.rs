//! Error types for the Appveyor client.
//!
//! # Design
//! `Api` covers every response the dispatcher refuses to treat as success:
//! a status other than 200/204, or a 200 whose body cannot be decoded. The
//! status code and a human-readable message travel with it. `Usage` is raised
//! before any request leaves the process, when the caller's arguments
//! contradict each other or miss something the endpoint requires.

/// Errors returned by `AppveyorClient` and the resource groups.
#[derive(Debug, thiserror::Error)]
pub enum AppveyorError {
    /// The server answered with a status the dispatcher does not accept.
    #[error("appveyor api error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Arguments were missing or contradictory; nothing was sent.
    #[error("invalid arguments: {0}")]
    Usage(String),

    /// The request never produced an HTTP response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Environment configuration could not be read.
    #[error("invalid configuration: {0}")]
    Config(#[from] envy::Error),

    /// No project is linked to the given repository.
    #[error("repository full name '{0}' is invalid")]
    UnknownRepository(String),
}

impl AppveyorError {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        AppveyorError::Usage(message.into())
    }

    /// The HTTP status carried by an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppveyorError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ureq::Error> for AppveyorError {
    fn from(err: ureq::Error) -> Self {
        AppveyorError::Transport(err.to_string())
    }
}
