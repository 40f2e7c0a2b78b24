//! Applies worker events to the story state.

use client_core::{Completion, StoryState};

use crate::controller::events::UiEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Nothing,
    Status(String),
    /// A new story replaced the previous one; cached illustrations are invalid.
    StoryInstalled,
    WorkerDown(String),
}

pub fn apply_ui_event(state: &mut StoryState, event: UiEvent) -> Effect {
    match event {
        UiEvent::Info(message) => Effect::Status(message),
        UiEvent::WorkerFailed(message) => Effect::WorkerDown(message),
        UiEvent::DescriptionFinished {
            selection_id,
            outcome,
        } => match state.finish_description(selection_id, outcome) {
            Completion::Applied => Effect::Status("Scenario ready".to_string()),
            Completion::Failed | Completion::Stale => Effect::Nothing,
        },
        UiEvent::StoryFinished {
            selection_id,
            outcome,
        } => match state.finish_story(selection_id, outcome) {
            Completion::Applied => Effect::StoryInstalled,
            Completion::Failed | Completion::Stale => Effect::Nothing,
        },
        UiEvent::NarrationFinished {
            selection_id,
            outcome,
        } => match state.finish_narration(selection_id, outcome) {
            Completion::Applied => Effect::Status("Narration finished".to_string()),
            Completion::Failed | Completion::Stale => Effect::Nothing,
        },
    }
}
