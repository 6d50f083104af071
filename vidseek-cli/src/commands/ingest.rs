//! Ingest command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;
use vidseek_core::{IngestPipeline, Manifest};

use crate::config::Settings;
use crate::utils::{build_hasher, load_manifest};

/// Directory pair for building a manifest from a folder of videos.
pub struct ScanDirs {
    pub videos: PathBuf,
    pub out: PathBuf,
}

/// Build the manifest from a scan, writing it to `manifest_path`.
fn scan_manifest(dirs: &ScanDirs, stride: u32, manifest_path: &Path) -> Result<Manifest> {
    let videos = std::fs::canonicalize(&dirs.videos)
        .with_context(|| format!("Failed to read video directory: {}", dirs.videos.display()))?;
    std::fs::create_dir_all(&dirs.out)
        .with_context(|| format!("Failed to create output directory: {}", dirs.out.display()))?;
    let out = std::fs::canonicalize(&dirs.out)
        .with_context(|| format!("Failed to create output directory: {}", dirs.out.display()))?;

    let manifest = Manifest::scan(&videos, &out, stride)
        .with_context(|| format!("Failed to scan video directory: {}", videos.display()))?;
    manifest
        .save(manifest_path)
        .with_context(|| format!("Failed to write manifest: {}", manifest_path.display()))?;

    info!(
        videos = %videos.display(),
        haystacks = manifest.len(),
        manifest = %manifest_path.display(),
        "Wrote manifest"
    );
    Ok(manifest)
}

/// Execute the ingest command.
pub fn execute(settings: &Settings, scan: Option<ScanDirs>, overwrite: bool) -> Result<()> {
    let mut manifest = match scan {
        Some(dirs) => scan_manifest(&dirs, settings.ingest_stride, &settings.manifest)?,
        None => load_manifest(&settings.manifest)?,
    };

    let hasher = build_hasher(settings)?;
    let report = IngestPipeline::new(&hasher)
        .overwrite(overwrite)
        .run(&manifest)
        .context("Ingestion failed")?;

    if manifest.apply_ingest(&report) {
        manifest.save(&settings.manifest).with_context(|| {
            format!("Failed to write manifest: {}", settings.manifest.display())
        })?;
        info!(manifest = %settings.manifest.display(), "Recorded ingest preprocessing");
    }

    println!();
    for item in &report {
        match item.samples {
            Some(samples) => println!(
                "   {} {:<6} {} fingerprints from {} frames -> {}",
                "Haystack".dimmed(),
                item.id.to_string().bold(),
                samples.to_string().green(),
                item.frames_decoded,
                item.path.display()
            ),
            None => println!(
                "   {} {:<6} {} {}",
                "Haystack".dimmed(),
                item.id.to_string().bold(),
                "skipped (exists)".yellow(),
                item.path.display()
            ),
        }
    }

    let written = report.iter().filter(|item| !item.skipped()).count();
    println!();
    println!(
        "{} {} of {} haystacks ingested",
        "Done:".green().bold(),
        written,
        report.len()
    );
    Ok(())
}
