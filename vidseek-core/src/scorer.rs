//! Sliding-window alignment scoring.
//!
//! For a needle of `n` samples and a haystack of `H` samples, every start
//! offset `o` whose window `o, o + step, ..., o + (n - 1) * step` fits inside
//! the haystack is scored by its aggregate distance: the sum of per-position
//! Hamming distances. Summing over the whole window tolerates isolated noisy
//! frames while still rewarding overall alignment.
//!
//! `step` is the number of haystack samples between consecutive needle
//! samples, `query_stride / haystack_stride`. The haystack stride must divide
//! the query stride, otherwise needle samples would fall between haystack
//! samples and the comparison would be misaligned.

use std::ops::Range;

use serde::Serialize;
use tracing::trace;

use crate::error::{Result, VidseekError};
use crate::fingerprint::Fingerprint;
use crate::sequence::FingerprintSequence;

/// Per-frame distance under which a window counts as a hit.
pub const DEFAULT_HIT_THRESHOLD: u32 = 8;

/// Best alignment of a needle inside one haystack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowMatch {
    /// Start offset in the haystack's sample index space.
    pub offset: usize,
    /// Aggregate Hamming distance of the window at `offset`.
    pub distance: u64,
    /// Number of windows whose aggregate distance stayed under
    /// `hit_threshold * n`.
    pub hits: usize,
}

/// Range of admissible start offsets for a haystack of `haystack_len`
/// samples, a needle of `needle_len` samples and the given step.
///
/// Empty when the needle is empty or does not fit.
pub fn window_offsets(haystack_len: usize, needle_len: usize, step: usize) -> Range<usize> {
    if needle_len == 0 {
        return 0..0;
    }
    let span = (needle_len - 1).saturating_mul(step);
    match haystack_len.checked_sub(span) {
        Some(end) => 0..end,
        None => 0..0,
    }
}

/// Step between needle samples in haystack index space.
pub fn alignment_step(query_stride: u32, haystack_stride: u32) -> Result<usize> {
    if query_stride == 0 {
        return Err(VidseekError::InvalidStride(query_stride));
    }
    if haystack_stride == 0 {
        return Err(VidseekError::InvalidStride(haystack_stride));
    }
    if query_stride % haystack_stride != 0 {
        return Err(VidseekError::IncompatibleStride {
            query: query_stride,
            haystack: haystack_stride,
        });
    }
    Ok((query_stride / haystack_stride) as usize)
}

/// Scores every admissible alignment of one needle against one haystack.
pub struct WindowScorer<'a> {
    needle: &'a [Fingerprint],
    haystack: &'a [Fingerprint],
    step: usize,
    hit_threshold: u32,
}

impl<'a> WindowScorer<'a> {
    pub fn new(needle: &'a FingerprintSequence, haystack: &'a FingerprintSequence) -> Result<Self> {
        let step = alignment_step(needle.stride(), haystack.stride())?;
        Ok(Self {
            needle: needle.as_slice(),
            haystack: haystack.as_slice(),
            step,
            hit_threshold: DEFAULT_HIT_THRESHOLD,
        })
    }

    pub fn with_hit_threshold(mut self, threshold: u32) -> Self {
        self.hit_threshold = threshold;
        self
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn offsets(&self) -> Range<usize> {
        window_offsets(self.haystack.len(), self.needle.len(), self.step)
    }

    /// Aggregate distance of the window starting at `offset`, or `None` if the
    /// window is not admissible.
    pub fn score_at(&self, offset: usize) -> Option<u64> {
        if !self.offsets().contains(&offset) {
            return None;
        }
        Some(self.window_distance(offset, u64::MAX))
    }

    /// `(offset, aggregate distance)` for every admissible offset, in
    /// ascending offset order.
    pub fn scores(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.offsets()
            .map(move |offset| (offset, self.window_distance(offset, u64::MAX)))
    }

    /// Minimum aggregate distance and the first offset achieving it.
    ///
    /// Returns `None` for an empty needle or when no window fits. A window is
    /// abandoned as soon as its running sum can neither beat the current
    /// minimum nor count as a hit; this never changes the reported minimum.
    pub fn best(&self) -> Option<WindowMatch> {
        let hit_bound = u64::from(self.hit_threshold) * self.needle.len() as u64;
        let mut best: Option<WindowMatch> = None;
        let mut hits = 0;

        for offset in self.offsets() {
            let best_distance = best.map_or(u64::MAX, |b| b.distance);
            let bound = best_distance.max(hit_bound.saturating_sub(1));
            let distance = self.window_distance(offset, bound);

            if distance < hit_bound {
                hits += 1;
            }
            if distance < best_distance {
                best = Some(WindowMatch {
                    offset,
                    distance,
                    hits: 0,
                });
            }
        }

        if let Some(found) = &best {
            trace!(
                offset = found.offset,
                distance = found.distance,
                hits,
                windows = self.offsets().len(),
                "Scored haystack"
            );
        }
        best.map(|b| WindowMatch { hits, ..b })
    }

    /// Sum of per-position distances at `offset`. Stops early once the sum
    /// exceeds `bound`; the returned value is then some number greater than
    /// `bound`.
    fn window_distance(&self, offset: usize, bound: u64) -> u64 {
        let mut sum = 0u64;
        for (i, needle_fp) in self.needle.iter().enumerate() {
            let hay_fp = self.haystack[offset + i * self.step];
            sum += u64::from(hay_fp.distance(*needle_fp));
            if sum > bound {
                break;
            }
        }
        sum
    }
}
