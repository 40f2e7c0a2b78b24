//! Backend commands queued from UI to backend worker.

use client_core::{DescribeTicket, ImageSelection, NarrationTicket, StoryTicket};
use shared::domain::SelectionId;

pub enum BackendCommand {
    Describe {
        selection_id: SelectionId,
        image: ImageSelection,
    },
    GenerateStory {
        selection_id: SelectionId,
        prompt: String,
    },
    Narrate {
        selection_id: SelectionId,
        story_text: String,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Describe { .. } => "describe",
            Self::GenerateStory { .. } => "generate_story",
            Self::Narrate { .. } => "narrate",
        }
    }
}

impl From<DescribeTicket> for BackendCommand {
    fn from(ticket: DescribeTicket) -> Self {
        Self::Describe {
            selection_id: ticket.selection_id,
            image: ticket.image,
        }
    }
}

impl From<StoryTicket> for BackendCommand {
    fn from(ticket: StoryTicket) -> Self {
        Self::GenerateStory {
            selection_id: ticket.selection_id,
            prompt: ticket.prompt,
        }
    }
}

impl From<NarrationTicket> for BackendCommand {
    fn from(ticket: NarrationTicket) -> Self {
        Self::Narrate {
            selection_id: ticket.selection_id,
            story_text: ticket.story_text,
        }
    }
}
