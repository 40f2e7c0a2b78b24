//! Plain-text rendering of a story session.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use client_core::{OperationStatus, StoryState};
use shared::domain::Story;

pub fn render_state(state: &StoryState, out: &mut impl Write) -> io::Result<()> {
    if let Some(image) = state.selection() {
        writeln!(
            out,
            "Image: {} ({}, {} bytes)",
            image.file_name(),
            image.mime_type(),
            image.len()
        )?;
    }
    match state.status() {
        OperationStatus::Failed(message) => writeln!(out, "! {message}")?,
        status => {
            if let Some(progress) = status.progress_text() {
                writeln!(out, "{progress}")?;
            }
        }
    }
    if let Some(description) = state.description() {
        writeln!(out)?;
        writeln!(out, "STORY SCENARIO")?;
        writeln!(out, "{description}")?;
    }
    if let Some(story) = state.story() {
        writeln!(out)?;
        render_story(story, out)?;
    }
    Ok(())
}

pub fn render_story(story: &Story, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "GENERATED VISUAL STORY")?;
    for segment in story.segments() {
        writeln!(out)?;
        writeln!(out, "[{}] {}", segment.position.0 + 1, segment.paragraph)?;
        writeln!(out, "    Scene Description: {}", segment.description)?;
        if segment.image.is_none() {
            writeln!(out, "    (no illustration)")?;
        }
    }
    Ok(())
}

/// Writes every decodable segment image as `segment_<n>.jpg`. Segments whose
/// payload does not decode are skipped with a warning.
pub fn save_segment_images(story: &Story, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;

    let mut written = Vec::new();
    for segment in story.segments() {
        let Some(image) = &segment.image else {
            continue;
        };
        let bytes = match image.decode() {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(segment = segment.position.0, "skipping segment image: {err}");
                continue;
            }
        };
        let path = dir.join(format!("segment_{}.jpg", segment.position.0 + 1));
        fs::write(&path, bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
