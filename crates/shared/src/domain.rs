use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::{error::SegmentImageError, protocol::StorySegmentPayload};

macro_rules! id_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub $inner);
    };
}

id_newtype!(SegmentPosition, usize);
id_newtype!(SelectionId, u64);

/// Base64-encoded JPEG attached to a story segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentImage(String);

impl SegmentImage {
    pub fn new(base64_jpeg: impl Into<String>) -> Self {
        Self(base64_jpeg.into())
    }

    pub fn decode(&self) -> Result<Vec<u8>, SegmentImageError> {
        let trimmed = self.0.trim();
        if trimmed.is_empty() {
            return Err(SegmentImageError::Empty);
        }
        STANDARD
            .decode(trimmed)
            .map_err(|e| SegmentImageError::InvalidBase64(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySegment {
    pub position: SegmentPosition,
    pub paragraph: String,
    pub description: String,
    pub image: Option<SegmentImage>,
}

impl StorySegment {
    pub fn from_payload(position: usize, payload: StorySegmentPayload) -> Self {
        Self {
            position: SegmentPosition(position),
            paragraph: payload.paragraph,
            description: payload.description,
            image: payload
                .data
                .filter(|data| !data.trim().is_empty())
                .map(SegmentImage::new),
        }
    }
}

/// An ordered, non-empty story. Built in one step from a backend response so
/// a partially received story is never observable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    segments: Vec<StorySegment>,
}

impl Story {
    /// Returns `None` when the payload list is empty.
    pub fn from_payloads(payloads: Vec<StorySegmentPayload>) -> Option<Self> {
        if payloads.is_empty() {
            return None;
        }
        let segments = payloads
            .into_iter()
            .enumerate()
            .map(|(position, payload)| StorySegment::from_payload(position, payload))
            .collect();
        Some(Self { segments })
    }

    pub fn segments(&self) -> &[StorySegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// All paragraphs in sequence order, joined by a single space.
    pub fn narration_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.paragraph.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
