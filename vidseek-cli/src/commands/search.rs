//! Search command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use serde_json::json;
use tracing::{debug, info, warn};
use vidseek_core::{
    notify_match, rank, validate_fps, HaystackDatabase, MatchResult, Notify, SearchOptions,
    SequenceBuilder, VidseekError,
};

use crate::config::Settings;
use crate::utils::{build_hasher, format_timecode};
use crate::viewer::ProcessViewer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Machine-readable JSON on stdout
    Json,
}

/// Execute the search command.
pub fn execute(
    settings: &Settings,
    clip: PathBuf,
    top: usize,
    format: OutputFormat,
    play: bool,
) -> Result<()> {
    let database = HaystackDatabase::open(&settings.manifest).with_context(|| {
        format!(
            "Failed to load haystack database from manifest: {}",
            settings.manifest.display()
        )
    })?;

    let fps = validate_fps(settings.fps).context("Invalid --fps")?;
    let hasher = build_hasher(settings)?;
    database
        .check_downscale(hasher.downscale())
        .context("Query preprocessing does not match the haystack database")?;

    let needle = SequenceBuilder::new(&hasher, settings.query_stride)
        .context("Invalid query stride")?
        .build_from_location(&clip)
        .with_context(|| format!("Failed to fingerprint clip: {}", clip.display()))?;
    info!(
        clip = %clip.display(),
        samples = needle.len(),
        stride = needle.stride(),
        "Fingerprinted clip"
    );

    let options = SearchOptions {
        hit_threshold: settings.hit_threshold,
    };
    let mut ranked = rank(&needle, &database, &options).context("Search failed")?;
    if ranked.is_empty() {
        return Err(VidseekError::NoCandidate).context("Search failed");
    }
    ranked.truncate(top.max(1));

    match format {
        OutputFormat::Text => print_text(&ranked, fps),
        OutputFormat::Json => print_json(&ranked, needle.len(), needle.stride(), fps)?,
    }

    if play {
        let viewer = settings
            .viewer
            .as_deref()
            .map(ProcessViewer::new)
            .unwrap_or_default();
        launch(&viewer, &ranked[0], fps)?;
    }
    Ok(())
}

fn launch<N: Notify>(viewer: &N, best: &MatchResult, fps: f64) -> Result<()> {
    let launched = notify_match(viewer, best, fps).context("Failed to launch viewer")?;
    if launched {
        debug!(haystack = %best.haystack, "Viewer notified");
    } else {
        warn!(haystack = %best.haystack, "No video recorded for haystack, nothing to play");
    }
    Ok(())
}

fn print_text(ranked: &[MatchResult], fps: f64) {
    let best = &ranked[0];

    println!();
    println!("{}", "Best match".green().bold());
    println!("   {} {}", "Haystack:".dimmed(), best.haystack.to_string().bold());
    println!("   {} {}", "Offset:".dimmed(), best.offset);
    println!("   {} {}", "Distance:".dimmed(), best.distance);
    println!(
        "   {} {} ({})",
        "Start:".dimmed(),
        best.start_frame(),
        format_timecode(best.start_time(fps))
    );
    println!("   {} {}", "Hits:".dimmed(), best.hits);
    if let Some(video) = &best.video {
        println!("   {} {}", "Video:".dimmed(), video.display());
    }

    if ranked.len() > 1 {
        println!();
        println!("{}", "Runners-up".dimmed());
        for candidate in &ranked[1..] {
            println!(
                "   {} {:<6} {} {:<8} {} {}",
                "haystack".dimmed(),
                candidate.haystack,
                "offset".dimmed(),
                candidate.offset,
                "distance".dimmed(),
                candidate.distance
            );
        }
    }
}

fn print_json(ranked: &[MatchResult], samples: usize, stride: u32, fps: f64) -> Result<()> {
    let matches: Vec<_> = ranked
        .iter()
        .map(|m| {
            json!({
                "haystack": m.haystack,
                "offset": m.offset,
                "distance": m.distance,
                "hits": m.hits,
                "haystack_stride": m.haystack_stride,
                "start_frame": m.start_frame(),
                "start_seconds": m.start_time(fps).as_secs_f64(),
                "video": m.video.as_ref().map(|v| v.display().to_string()),
            })
        })
        .collect();

    let output = json!({
        "query": { "samples": samples, "stride": stride },
        "best": matches.first(),
        "matches": matches,
    });
    let text = serde_json::to_string_pretty(&output).context("Failed to serialize results")?;
    println!("{text}");
    Ok(())
}
