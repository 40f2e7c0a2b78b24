use std::error::Error as _;

use thiserror::Error;

pub type StoryResult<T> = Result<T, StoryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryErrorKind {
    Validation,
    Transport,
    Remote,
}

/// Failure of a story operation. Every variant renders as a single
/// human-readable line suitable for an error banner.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoryError {
    /// A precondition was not met; no request was sent.
    #[error("{0}")]
    Validation(String),
    /// The request could not complete.
    #[error("{0}")]
    Transport(String),
    /// The backend answered but reported failure or sent an unusable body.
    #[error("{0}")]
    Remote(String),
}

impl StoryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    pub fn kind(&self) -> StoryErrorKind {
        match self {
            Self::Validation(_) => StoryErrorKind::Validation,
            Self::Transport(_) => StoryErrorKind::Transport,
            Self::Remote(_) => StoryErrorKind::Remote,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message) | Self::Transport(message) | Self::Remote(message) => {
                message
            }
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Remote(format!("unexpected response from backend: {err}"));
        }
        if let Some(status) = err.status() {
            return Self::Remote(format!("backend returned {status}"));
        }
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::Transport(message)
    }
}
