//! Worker → UI events.

use client_core::StoryResult;
use shared::domain::{SelectionId, Story};

pub enum UiEvent {
    Info(String),
    /// The worker could not start; no command will ever complete.
    WorkerFailed(String),
    DescriptionFinished {
        selection_id: SelectionId,
        outcome: StoryResult<String>,
    },
    StoryFinished {
        selection_id: SelectionId,
        outcome: StoryResult<Story>,
    },
    NarrationFinished {
        selection_id: SelectionId,
        outcome: StoryResult<()>,
    },
}
