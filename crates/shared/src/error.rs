use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body the story backend returns alongside failing requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    /// Parses a raw response body, returning `None` unless it is an error body
    /// with a non-blank message.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        let parsed: Self = serde_json::from_slice(body).ok()?;
        if parsed.error.trim().is_empty() {
            None
        } else {
            Some(parsed)
        }
    }

    pub fn message(&self) -> &str {
        &self.error
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentImageError {
    #[error("segment image payload is empty")]
    Empty,
    #[error("segment image payload is not valid base64: {0}")]
    InvalidBase64(String),
}
