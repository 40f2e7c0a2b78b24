//! Command orchestration helpers from UI actions to backend command queue.
//!
//! Each trigger runs the matching `begin_*` transition first; if the command
//! cannot be queued the operation is finished immediately as a transport
//! failure so its busy flag never sticks.

use client_core::{StoryError, StoryState};
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), String> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => Err("UI command queue is full; please retry".to_string()),
        Err(TrySendError::Disconnected(_)) => Err(
            "Backend command processor disconnected (possible startup/runtime failure)"
                .to_string(),
        ),
    }
}

pub fn request_description(state: &mut StoryState, cmd_tx: &Sender<BackendCommand>) {
    let ticket = match state.begin_description() {
        Ok(ticket) => ticket,
        Err(err) => {
            tracing::debug!("describe trigger rejected: {err}");
            return;
        }
    };
    let selection_id = ticket.selection_id;
    if let Err(message) = dispatch_backend_command(cmd_tx, ticket.into()) {
        state.finish_description(selection_id, Err(StoryError::Transport(message)));
    }
}

pub fn request_story(state: &mut StoryState, cmd_tx: &Sender<BackendCommand>) {
    let ticket = match state.begin_story() {
        Ok(ticket) => ticket,
        Err(err) => {
            tracing::debug!("story trigger rejected: {err}");
            return;
        }
    };
    let selection_id = ticket.selection_id;
    if let Err(message) = dispatch_backend_command(cmd_tx, ticket.into()) {
        state.finish_story(selection_id, Err(StoryError::Transport(message)));
    }
}

pub fn request_narration(state: &mut StoryState, cmd_tx: &Sender<BackendCommand>) {
    let Some(ticket) = state.begin_narration() else {
        return;
    };
    let selection_id = ticket.selection_id;
    if let Err(message) = dispatch_backend_command(cmd_tx, ticket.into()) {
        state.finish_narration(selection_id, Err(StoryError::Transport(message)));
    }
}
