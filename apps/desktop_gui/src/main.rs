use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{config::load_settings, HttpStoryBackend};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::ImageTalesApp;

#[derive(Parser, Debug)]
struct Args {
    /// Overrides the configured backend origin.
    #[arg(long)]
    backend_url: Option<String>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.backend_url {
        settings.backend_url = url;
    }
    let backend =
        HttpStoryBackend::from_settings(&settings).context("invalid backend configuration")?;
    let backend_url = backend.server_url().to_string();
    tracing::info!(backend = %backend_url, "using story backend");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, Arc::new(backend));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("ImageTales")
            .with_inner_size([1180.0, 780.0])
            .with_min_inner_size([860.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "ImageTales",
        options,
        Box::new(move |_cc| Ok(Box::new(ImageTalesApp::new(cmd_tx, ui_rx, backend_url)))),
    )
    .map_err(|err| anyhow!("failed to start the ui: {err}"))
}
