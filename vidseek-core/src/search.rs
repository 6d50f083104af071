//! Best-match selection across the whole haystack database.
//!
//! Every haystack is scored independently (in parallel on the rayon pool)
//! and the per-haystack winners are ordered by `(distance, id, offset)`, so
//! the reported match does not depend on scan order or scheduling.

use std::path::PathBuf;
use std::time::Duration;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::database::{HaystackDatabase, HaystackId, HaystackRecord};
use crate::error::{Result, VidseekError};
use crate::scorer::{WindowScorer, DEFAULT_HIT_THRESHOLD};
use crate::sequence::FingerprintSequence;

/// Search tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Per-frame distance under which a window counts as a hit.
    pub hit_threshold: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            hit_threshold: DEFAULT_HIT_THRESHOLD,
        }
    }
}

/// Best alignment of the needle inside one haystack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub haystack: HaystackId,
    /// Start offset in the haystack's sample index space.
    pub offset: usize,
    /// Aggregate Hamming distance of the winning window.
    pub distance: u64,
    /// Windows in this haystack that scored under the hit bound.
    pub hits: usize,
    /// Stride the haystack was sampled at.
    pub haystack_stride: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<PathBuf>,
}

impl MatchResult {
    /// Raw frame index in the haystack video where the match starts.
    pub fn start_frame(&self) -> u64 {
        self.offset as u64 * u64::from(self.haystack_stride)
    }

    /// Playback time of [`MatchResult::start_frame`] at `fps` frames per
    /// second. Saturates at [`Duration::MAX`].
    pub fn start_time(&self, fps: f64) -> Duration {
        if !(fps.is_finite() && fps > 0.0) {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.start_frame() as f64 / fps).unwrap_or(Duration::MAX)
    }

    /// Ordering key: lower distance first, then lower id, then lower offset.
    pub fn rank_key(&self) -> (u64, HaystackId, usize) {
        (self.distance, self.haystack, self.offset)
    }
}

/// Check that `fps` is a usable playback frame rate.
pub fn validate_fps(fps: f64) -> Result<f64> {
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(VidseekError::InvalidQuery(format!(
            "Frame rate must be a positive number, got {}",
            fps
        )))
    }
}

fn score_haystack(
    needle: &FingerprintSequence,
    record: &HaystackRecord,
    options: &SearchOptions,
) -> Result<Option<MatchResult>> {
    let scorer = WindowScorer::new(needle, &record.sequence)?.with_hit_threshold(options.hit_threshold);
    let found = scorer.best().map(|window| MatchResult {
        haystack: record.id,
        offset: window.offset,
        distance: window.distance,
        hits: window.hits,
        haystack_stride: record.sequence.stride(),
        video: record.video.clone(),
    });

    debug!(
        haystack = %record.id,
        samples = record.sequence.len(),
        offset = found.as_ref().map(|m| m.offset),
        distance = found.as_ref().map(|m| m.distance),
        "Scanned haystack"
    );
    Ok(found)
}

fn validate_needle(needle: &FingerprintSequence) -> Result<()> {
    if needle.is_empty() {
        return Err(VidseekError::InvalidQuery(
            "query clip produced no fingerprints".into(),
        ));
    }
    Ok(())
}

/// Best alignment in every haystack that admits at least one window, sorted
/// best first.
pub fn rank(
    needle: &FingerprintSequence,
    database: &HaystackDatabase,
    options: &SearchOptions,
) -> Result<Vec<MatchResult>> {
    validate_needle(needle)?;

    let per_haystack = database
        .par_records()
        .map(|record| score_haystack(needle, record, options))
        .collect::<Result<Vec<_>>>()?;

    let mut ranked: Vec<MatchResult> = per_haystack.into_iter().flatten().collect();
    ranked.sort_unstable_by_key(MatchResult::rank_key);
    Ok(ranked)
}

/// The single best match across the database.
///
/// Fails with [`VidseekError::NoCandidate`] when the database is empty or no
/// haystack is long enough for the needle, and with
/// [`VidseekError::InvalidQuery`] when the needle is empty.
pub fn best_match(
    needle: &FingerprintSequence,
    database: &HaystackDatabase,
    options: &SearchOptions,
) -> Result<MatchResult> {
    validate_needle(needle)?;

    let best = database
        .par_records()
        .map(|record| score_haystack(needle, record, options))
        .try_fold(
            || None::<MatchResult>,
            |acc, found| found.map(|found| min_option(acc, found)),
        )
        .try_reduce(|| None, |a, b| Ok(min_option(a, b)))?
        .ok_or(VidseekError::NoCandidate)?;

    info!(
        haystack = %best.haystack,
        offset = best.offset,
        distance = best.distance,
        needle_samples = needle.len(),
        "Best match"
    );
    Ok(best)
}

fn min_option(a: Option<MatchResult>, b: Option<MatchResult>) -> Option<MatchResult> {
    match (a, b) {
        (Some(a), Some(b)) => Some(std::cmp::min_by_key(a, b, MatchResult::rank_key)),
        (a, b) => a.or(b),
    }
}
