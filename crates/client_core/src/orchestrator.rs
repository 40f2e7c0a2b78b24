use std::sync::Arc;

use shared::domain::SelectionId;
use tracing::info;

use crate::{
    error::{StoryError, StoryResult},
    selection::ImageSelection,
    state::{Completion, StoryState},
    StoryBackend,
};

/// Drives the describe → story → narrate pipeline against a backend.
///
/// Calls take `&mut self`, so a single orchestrator runs one request at a
/// time. Front ends that need to keep rendering while a request is out can
/// drive [`StoryState`] transitions themselves instead.
pub struct StoryOrchestrator {
    backend: Arc<dyn StoryBackend>,
    state: StoryState,
}

impl StoryOrchestrator {
    pub fn new(backend: Arc<dyn StoryBackend>) -> Self {
        Self {
            backend,
            state: StoryState::new(),
        }
    }

    pub fn state(&self) -> &StoryState {
        &self.state
    }

    pub fn select_image(&mut self, image: ImageSelection) -> SelectionId {
        self.state.select_image(image)
    }

    pub async fn request_description(&mut self) -> StoryResult<()> {
        let ticket = self.state.begin_description()?;
        let outcome = self.backend.describe_image(&ticket.image).await;
        let failure = outcome.as_ref().err().cloned();
        let completion = self.state.finish_description(ticket.selection_id, outcome);
        self.finish(completion, failure)
    }

    pub async fn request_story(&mut self) -> StoryResult<()> {
        let ticket = self.state.begin_story()?;
        let outcome = self.backend.generate_story(&ticket.prompt).await;
        let failure = outcome.as_ref().err().cloned();
        let completion = self.state.finish_story(ticket.selection_id, outcome);
        self.finish(completion, failure)
    }

    /// Returns `Ok(false)` when the trigger was ignored.
    pub async fn play_narration(&mut self) -> StoryResult<bool> {
        let Some(ticket) = self.state.begin_narration() else {
            return Ok(false);
        };
        info!(bytes = ticket.story_text.len(), "starting narration");
        let outcome = self.backend.narrate(&ticket.story_text).await;
        let failure = outcome.as_ref().err().cloned();
        let completion = self.state.finish_narration(ticket.selection_id, outcome);
        self.finish(completion, failure)?;
        Ok(true)
    }

    fn finish(&self, completion: Completion, failure: Option<StoryError>) -> StoryResult<()> {
        match (completion, failure) {
            (Completion::Failed, Some(err)) => Err(err),
            (Completion::Failed, None) => Err(StoryError::remote(
                self.state.error().unwrap_or("operation failed"),
            )),
            (Completion::Applied | Completion::Stale, _) => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
