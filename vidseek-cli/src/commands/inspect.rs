//! Inspect command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use vidseek_core::{read_sequence, HaystackId, VidseekError};

use crate::config::Settings;
use crate::utils::load_manifest;

/// Execute the inspect command.
pub fn execute(settings: &Settings, id: u32, head: usize) -> Result<()> {
    let id = HaystackId(id);
    let manifest = load_manifest(&settings.manifest)?;
    let entry = manifest
        .get(id)
        .ok_or(VidseekError::UnknownHaystack(id))
        .context("Inspect failed")?;

    let sequence = read_sequence(&entry.fingerprints, entry.id, entry.stride)
        .with_context(|| format!("Failed to read record for haystack {}", id))?;

    println!();
    println!("{} {}", "Haystack".green().bold(), id.to_string().bold());
    println!("   {} {}", "Record:".dimmed(), entry.fingerprints.display());
    if let Some(video) = &entry.video {
        println!("   {} {}", "Video:".dimmed(), video.display());
    }
    println!("   {} {}", "Stride:".dimmed(), sequence.stride());
    if let Some(downscale) = entry.downscale {
        println!("   {} {}", "Downscale:".dimmed(), downscale);
    }
    println!("   {} {}", "Samples:".dimmed(), sequence.len());
    if !sequence.is_empty() {
        println!(
            "   {} 0..={}",
            "Frames:".dimmed(),
            sequence.frame_of(sequence.len() - 1)
        );
    }

    if head > 0 && !sequence.is_empty() {
        println!();
        for (sample, fingerprint) in sequence.iter_indexed().take(head) {
            println!(
                "   {:>8}  {}",
                sequence.frame_of(sample).to_string().dimmed(),
                fingerprint
            );
        }
    }
    Ok(())
}
