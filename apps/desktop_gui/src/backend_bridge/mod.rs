//! Bridge between the UI thread and the background request worker.

pub mod commands;
pub mod runtime;
