use std::{io, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings, HttpStoryBackend, ImageSelection, Operation, StoryBackend,
    StoryOrchestrator, StoryResult,
};
use tracing_subscriber::EnvFilter;

mod render;

use render::{render_state, render_story, save_segment_images};

#[derive(Parser, Debug)]
#[command(name = "image-tales", about = "Turn a picture into an illustrated, narrated story")]
struct Cli {
    /// Overrides the configured backend origin.
    #[arg(long, global = true)]
    backend_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Describe an image, write a story from the description, and optionally narrate it.
    Run {
        image: PathBuf,
        #[arg(long)]
        narrate: bool,
        /// Directory for the segment illustrations.
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Print the final story as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Only generate the scenario for an image.
    Describe { image: PathBuf },
    /// Generate a story straight from a prompt.
    Story {
        prompt: String,
        #[arg(long)]
        narrate: bool,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(url) = cli.backend_url {
        settings.backend_url = url;
    }
    let backend = Arc::new(
        HttpStoryBackend::from_settings(&settings).context("invalid backend configuration")?,
    );
    tracing::info!(backend = backend.server_url(), "using story backend");

    match cli.command {
        Command::Run {
            image,
            narrate,
            output_dir,
            json,
        } => {
            let image = ImageSelection::from_path(&image)?;
            let mut orchestrator = StoryOrchestrator::new(backend);
            orchestrator.select_image(image);

            eprintln!("{}", Operation::Describe.progress_text());
            let described = orchestrator.request_description().await;
            finish_step(&orchestrator, described)?;

            eprintln!("{}", Operation::Story.progress_text());
            let storied = orchestrator.request_story().await;
            finish_step(&orchestrator, storied)?;

            if let (Some(dir), Some(story)) = (&output_dir, orchestrator.state().story()) {
                for path in save_segment_images(story, dir)? {
                    eprintln!("saved {}", path.display());
                }
            }

            if json {
                let story = orchestrator.state().story();
                println!("{}", serde_json::to_string_pretty(&story)?);
            } else {
                render_state(orchestrator.state(), &mut io::stdout().lock())?;
            }

            if narrate {
                eprintln!("{}", Operation::Narrate.progress_text());
                let narrated = orchestrator.play_narration().await.map(|_| ());
                finish_step(&orchestrator, narrated)?;
            }
        }
        Command::Describe { image } => {
            let image = ImageSelection::from_path(&image)?;
            let mut orchestrator = StoryOrchestrator::new(backend);
            orchestrator.select_image(image);

            eprintln!("{}", Operation::Describe.progress_text());
            let described = orchestrator.request_description().await;
            finish_step(&orchestrator, described)?;
            render_state(orchestrator.state(), &mut io::stdout().lock())?;
        }
        Command::Story {
            prompt,
            narrate,
            output_dir,
        } => {
            eprintln!("{}", Operation::Story.progress_text());
            let story = backend
                .generate_story(&prompt)
                .await
                .context("Error generating story")?;
            if let Some(dir) = &output_dir {
                for path in save_segment_images(&story, dir)? {
                    eprintln!("saved {}", path.display());
                }
            }
            render_story(&story, &mut io::stdout().lock())?;

            if narrate {
                eprintln!("{}", Operation::Narrate.progress_text());
                backend
                    .narrate(&story.narration_text())
                    .await
                    .context("Error playing audio")?;
            }
        }
    }

    Ok(())
}

/// Prints the error banner held in state and stops the pipeline on failure.
fn finish_step(orchestrator: &StoryOrchestrator, outcome: StoryResult<()>) -> Result<()> {
    if let Err(err) = outcome {
        render_state(orchestrator.state(), &mut io::stderr().lock())?;
        tracing::debug!(kind = ?err.kind(), "pipeline stopped");
        bail!(
            "{}",
            orchestrator.state().error().unwrap_or(err.message()).to_string()
        );
    }
    Ok(())
}
