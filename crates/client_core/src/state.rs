//! Story session state and its transitions.
//!
//! Every remote operation is split into a `begin_*` transition, which checks
//! preconditions, marks the operation busy and hands back a ticket carrying
//! the request inputs, and a `finish_*` transition that applies the outcome.
//! Nothing here performs I/O, so render layers can own the state directly and
//! run the request wherever they like.

use shared::domain::{SelectionId, Story};
use tracing::{debug, warn};

use crate::{
    error::{StoryError, StoryResult},
    selection::ImageSelection,
};

pub const NO_IMAGE_SELECTED: &str = "no image selected";
pub const NO_DESCRIPTION: &str = "no description generated";
pub const ALREADY_IN_FLIGHT: &str = "operation already in flight";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Describe,
    Story,
    Narrate,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Describe => "describe",
            Self::Story => "story",
            Self::Narrate => "narrate",
        }
    }

    pub fn progress_text(self) -> &'static str {
        match self {
            Self::Describe => "Generating description...",
            Self::Story => "Generating visual story...",
            Self::Narrate => "Playing audio...",
        }
    }

    fn failure_prefix(self) -> &'static str {
        match self {
            Self::Describe => "Error generating description",
            Self::Story => "Error generating story",
            Self::Narrate => "Error playing audio",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    Idle,
    DescribingImage,
    GeneratingStory,
    PlayingAudio,
    Failed(String),
}

impl OperationStatus {
    pub fn progress_text(&self) -> Option<&'static str> {
        match self {
            Self::DescribingImage => Some(Operation::Describe.progress_text()),
            Self::GeneratingStory => Some(Operation::Story.progress_text()),
            Self::PlayingAudio => Some(Operation::Narrate.progress_text()),
            Self::Idle | Self::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Per-operation busy flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InFlight {
    pub describing: bool,
    pub generating: bool,
    pub narrating: bool,
}

impl InFlight {
    /// Description and story generation share one slot, like the single
    /// loading indicator they drive.
    pub fn loading(&self) -> bool {
        self.describing || self.generating
    }

    pub fn any(&self) -> bool {
        self.loading() || self.narrating
    }
}

/// What a front end shows for the current selection. Render layers cache
/// their decoded preview by `selection_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub selection_id: SelectionId,
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct DescribeTicket {
    pub selection_id: SelectionId,
    pub image: ImageSelection,
}

#[derive(Debug, Clone)]
pub struct StoryTicket {
    pub selection_id: SelectionId,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct NarrationTicket {
    pub selection_id: SelectionId,
    pub story_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Failed,
    /// The selection changed while the request was outstanding; the outcome
    /// was dropped.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct StoryState {
    last_selection_id: u64,
    selection: Option<ImageSelection>,
    preview: Option<Preview>,
    description: Option<String>,
    story: Option<Story>,
    in_flight: InFlight,
    error: Option<String>,
}

impl StoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<&ImageSelection> {
        self.selection.as_ref()
    }

    pub fn selection_id(&self) -> Option<SelectionId> {
        self.preview.as_ref().map(|preview| preview.selection_id)
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    pub fn in_flight(&self) -> InFlight {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> OperationStatus {
        if self.in_flight.describing {
            OperationStatus::DescribingImage
        } else if self.in_flight.generating {
            OperationStatus::GeneratingStory
        } else if self.in_flight.narrating {
            OperationStatus::PlayingAudio
        } else if let Some(message) = &self.error {
            OperationStatus::Failed(message.clone())
        } else {
            OperationStatus::Idle
        }
    }

    pub fn can_describe(&self) -> bool {
        self.selection.is_some() && !self.in_flight.loading()
    }

    pub fn can_generate_story(&self) -> bool {
        self.description.is_some() && !self.in_flight.loading()
    }

    pub fn can_narrate(&self) -> bool {
        self.story.is_some() && !self.in_flight.narrating
    }

    /// Installs a new image and drops everything derived from the previous one.
    pub fn select_image(&mut self, image: ImageSelection) -> SelectionId {
        self.last_selection_id += 1;
        let selection_id = SelectionId(self.last_selection_id);
        self.preview = Some(Preview {
            selection_id,
            file_name: image.file_name().to_string(),
        });
        self.selection = Some(image);
        self.description = None;
        self.story = None;
        self.error = None;
        debug!(selection = selection_id.0, "image selected");
        selection_id
    }

    pub fn begin_description(&mut self) -> StoryResult<DescribeTicket> {
        if self.in_flight.loading() {
            return Err(StoryError::validation(ALREADY_IN_FLIGHT));
        }
        let (Some(image), Some(selection_id)) = (self.selection.clone(), self.selection_id())
        else {
            return Err(self.reject(NO_IMAGE_SELECTED));
        };
        self.error = None;
        self.in_flight.describing = true;
        Ok(DescribeTicket {
            selection_id,
            image,
        })
    }

    pub fn finish_description(
        &mut self,
        selection_id: SelectionId,
        outcome: StoryResult<String>,
    ) -> Completion {
        self.in_flight.describing = false;
        if self.is_stale(Operation::Describe, selection_id) {
            return Completion::Stale;
        }
        match outcome {
            Ok(description) if !description.trim().is_empty() => {
                self.description = Some(description);
                Completion::Applied
            }
            Ok(_) => self.fail(
                Operation::Describe,
                &StoryError::remote("backend returned an empty description"),
            ),
            Err(err) => self.fail(Operation::Describe, &err),
        }
    }

    pub fn begin_story(&mut self) -> StoryResult<StoryTicket> {
        if self.in_flight.loading() {
            return Err(StoryError::validation(ALREADY_IN_FLIGHT));
        }
        let (Some(prompt), Some(selection_id)) = (self.description.clone(), self.selection_id())
        else {
            return Err(self.reject(NO_DESCRIPTION));
        };
        self.error = None;
        self.in_flight.generating = true;
        Ok(StoryTicket {
            selection_id,
            prompt,
        })
    }

    pub fn finish_story(
        &mut self,
        selection_id: SelectionId,
        outcome: StoryResult<Story>,
    ) -> Completion {
        self.in_flight.generating = false;
        if self.is_stale(Operation::Story, selection_id) {
            return Completion::Stale;
        }
        match outcome {
            Ok(story) => {
                self.story = Some(story);
                Completion::Applied
            }
            Err(err) => self.fail(Operation::Story, &err),
        }
    }

    /// Returns `None`, leaving the state untouched, when there is nothing to
    /// narrate or a narration is already playing.
    pub fn begin_narration(&mut self) -> Option<NarrationTicket> {
        if self.in_flight.narrating {
            debug!("narration already in flight; ignoring trigger");
            return None;
        }
        let story_text = self.story.as_ref()?.narration_text();
        let selection_id = self.selection_id()?;
        self.error = None;
        self.in_flight.narrating = true;
        Some(NarrationTicket {
            selection_id,
            story_text,
        })
    }

    pub fn finish_narration(
        &mut self,
        selection_id: SelectionId,
        outcome: StoryResult<()>,
    ) -> Completion {
        self.in_flight.narrating = false;
        if self.is_stale(Operation::Narrate, selection_id) {
            return Completion::Stale;
        }
        match outcome {
            Ok(()) => Completion::Applied,
            Err(err) => self.fail(Operation::Narrate, &err),
        }
    }

    fn reject(&mut self, message: &str) -> StoryError {
        self.error = Some(message.to_string());
        StoryError::validation(message)
    }

    fn fail(&mut self, operation: Operation, err: &StoryError) -> Completion {
        let message = format!("{}: {err}", operation.failure_prefix());
        warn!(
            operation = operation.as_str(),
            kind = ?err.kind(),
            "{message}"
        );
        self.error = Some(message);
        Completion::Failed
    }

    fn is_stale(&self, operation: Operation, selection_id: SelectionId) -> bool {
        let stale = self.selection_id() != Some(selection_id);
        if stale {
            warn!(
                operation = operation.as_str(),
                request_selection = selection_id.0,
                current_selection = ?self.selection_id().map(|id| id.0),
                "dropping result for a replaced image"
            );
        }
        stale
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
