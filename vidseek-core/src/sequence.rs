//! Fingerprint sequences and the builder that samples them from a frame
//! source.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, VidseekError};
use crate::fingerprint::Fingerprint;
use crate::hasher::FrameHasher;
use crate::source::{open_source, FrameSource};

/// Ordered fingerprints of the sampled frames of one video.
///
/// Entry `i` is the fingerprint of raw frame `i * stride`. Order is exactly
/// sample order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintSequence {
    stride: u32,
    fingerprints: Vec<Fingerprint>,
}

impl FingerprintSequence {
    pub fn new(stride: u32, fingerprints: Vec<Fingerprint>) -> Result<Self> {
        validate_stride(stride)?;
        Ok(Self {
            stride,
            fingerprints,
        })
    }

    pub fn empty(stride: u32) -> Result<Self> {
        Self::new(stride, Vec::new())
    }

    /// Number of raw frames between consecutive samples.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    pub fn as_slice(&self) -> &[Fingerprint] {
        &self.fingerprints
    }

    pub fn get(&self, sample: usize) -> Option<Fingerprint> {
        self.fingerprints.get(sample).copied()
    }

    /// `(sample index, fingerprint)` pairs in sample order.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, Fingerprint)> + '_ {
        self.fingerprints.iter().copied().enumerate()
    }

    /// Raw frame index of sample `sample`.
    pub fn frame_of(&self, sample: usize) -> u64 {
        sample as u64 * u64::from(self.stride)
    }

    /// Copy `len` samples starting at `start`, stepping `step` samples at a
    /// time, into a new sequence with stride `self.stride * step`.
    ///
    /// Returns `None` if the requested window runs past the end.
    pub fn subsample(&self, start: usize, len: usize, step: usize) -> Option<Self> {
        if step == 0 {
            return None;
        }
        let mut fingerprints = Vec::with_capacity(len);
        for i in 0..len {
            fingerprints.push(self.get(start + i * step)?);
        }
        let stride = self.stride.checked_mul(u32::try_from(step).ok()?)?;
        Some(Self {
            stride,
            fingerprints,
        })
    }

    pub fn into_fingerprints(self) -> Vec<Fingerprint> {
        self.fingerprints
    }
}

pub(crate) fn validate_stride(stride: u32) -> Result<u32> {
    if stride == 0 {
        Err(VidseekError::InvalidStride(stride))
    } else {
        Ok(stride)
    }
}

/// Samples a frame source at a fixed stride and fingerprints each sample.
///
/// Every frame is decoded (to advance the source) but only frames whose raw
/// index is a multiple of the stride are hashed.
pub struct SequenceBuilder<'h, H: FrameHasher + ?Sized> {
    hasher: &'h H,
    stride: u32,
}

impl<'h, H: FrameHasher + ?Sized> SequenceBuilder<'h, H> {
    pub fn new(hasher: &'h H, stride: u32) -> Result<Self> {
        validate_stride(stride)?;
        Ok(Self { hasher, stride })
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Consume `source` and build its fingerprint sequence.
    ///
    /// A source with zero frames yields an empty sequence.
    pub fn build<S: FrameSource + ?Sized>(&self, source: &mut S) -> Result<FingerprintSequence> {
        let stride = u64::from(self.stride);
        let capacity = source
            .frame_count_hint()
            .map(|n| n.div_ceil(stride) as usize)
            .unwrap_or_default();
        let mut fingerprints = Vec::with_capacity(capacity);
        let mut decoded = 0u64;

        loop {
            let frame_index = source.position();
            let Some(frame) = source.next_frame()? else {
                break;
            };
            decoded += 1;

            if frame_index % stride == 0 {
                debug_assert_eq!((frame_index / stride) as usize, fingerprints.len());
                fingerprints.push(self.hasher.hash(&frame));
            }
        }

        debug!(
            frames = decoded,
            samples = fingerprints.len(),
            stride = self.stride,
            "Built fingerprint sequence"
        );

        Ok(FingerprintSequence {
            stride: self.stride,
            fingerprints,
        })
    }

    /// Open `location` with [`open_source`] and build its sequence.
    pub fn build_from_location(&self, location: &Path) -> Result<FingerprintSequence> {
        let mut source = open_source(location)?;
        let sequence = self.build(&mut source)?;
        info!(
            location = %location.display(),
            samples = sequence.len(),
            stride = self.stride,
            "Fingerprinted video"
        );
        Ok(sequence)
    }
}
