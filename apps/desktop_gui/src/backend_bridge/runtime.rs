//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::StoryBackend;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Starts the worker thread. Each command runs as its own task so a playing
/// narration does not hold up a new description.
pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    backend: Arc<dyn StoryBackend>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::WorkerFailed(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                return;
            }
        };
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

        while let Ok(cmd) = cmd_rx.recv() {
            let backend = backend.clone();
            let ui_tx = ui_tx.clone();
            runtime.spawn(async move {
                let event = run_command(backend.as_ref(), cmd).await;
                if ui_tx.send(event).is_err() {
                    tracing::debug!("ui closed before backend result arrived");
                }
            });
        }
        tracing::debug!("ui command queue closed; backend worker exiting");
    });
}

pub async fn run_command(backend: &dyn StoryBackend, cmd: BackendCommand) -> UiEvent {
    tracing::debug!(command = cmd.name(), "running backend command");
    match cmd {
        BackendCommand::Describe {
            selection_id,
            image,
        } => UiEvent::DescriptionFinished {
            selection_id,
            outcome: backend.describe_image(&image).await,
        },
        BackendCommand::GenerateStory {
            selection_id,
            prompt,
        } => UiEvent::StoryFinished {
            selection_id,
            outcome: backend.generate_story(&prompt).await,
        },
        BackendCommand::Narrate {
            selection_id,
            story_text,
        } => UiEvent::NarrationFinished {
            selection_id,
            outcome: backend.narrate(&story_text).await,
        },
    }
}
