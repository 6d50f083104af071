//! Common utility functions shared across CLI commands.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;
use vidseek_core::{Manifest, PerceptualHasher};

use crate::config::Settings;

/// Load the manifest named by the settings.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let manifest = Manifest::load(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    debug!(path = %path.display(), haystacks = manifest.len(), "Using manifest");
    Ok(manifest)
}

/// Hasher shared by ingestion and search so both sides preprocess frames
/// identically.
pub fn build_hasher(settings: &Settings) -> Result<PerceptualHasher> {
    let downscale =
        PerceptualHasher::validate_downscale(settings.downscale).context("Invalid --downscale")?;
    Ok(PerceptualHasher::default().with_downscale(downscale))
}

/// Format a playback offset as `HH:MM:SS.mmm`.
pub fn format_timecode(offset: Duration) -> String {
    let total_ms = offset.as_millis();
    let ms = total_ms % 1000;
    let secs = (total_ms / 1000) % 60;
    let mins = (total_ms / 60_000) % 60;
    let hours = total_ms / 3_600_000;
    format!("{hours:02}:{mins:02}:{secs:02}.{ms:03}")
}
