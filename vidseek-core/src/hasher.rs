//! Perceptual hashing of decoded frames.
//!
//! # Algorithm
//!
//! Uses the Blockhash algorithm which produces a consistent 64-bit (8 byte)
//! hash. The hash is robust against re-encoding, rescaling and mild
//! compression artifacts, which is what lets a re-encoded clip still land
//! within a small Hamming distance of the original frames.
//!
//! # Preprocessing
//!
//! A [`PerceptualHasher`] may downscale each frame before hashing. The same
//! hasher configuration must be used for ingestion and for queries, otherwise
//! distances between the two sides stop being meaningful.
//!
//! ```no_run
//! use vidseek_core::hasher::{FrameHasher, PerceptualHasher};
//!
//! let frame = image::open("frame_0001.png").unwrap();
//! let hasher = PerceptualHasher::default().with_downscale(0.5);
//! let fingerprint = hasher.hash(&frame);
//! println!("{fingerprint}");
//! ```

use std::borrow::Cow;

use blockhash::{blockhash64, Blockhash64};
use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VidseekError};
use crate::fingerprint::{Fingerprint, FINGERPRINT_SIZE};

/// Maps one raster frame to a [`Fingerprint`].
///
/// Implementations must be deterministic and thread-safe so that ingestion can
/// hash independent haystacks in parallel.
pub trait FrameHasher: Send + Sync {
    fn hash(&self, frame: &DynamicImage) -> Fingerprint;

    /// Resize factor applied to frames before hashing. Fingerprints built
    /// with different factors are not comparable.
    fn downscale(&self) -> f32 {
        1.0
    }
}

/// Perceptual hash algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// Blockhash64 - consistent 64-bit output, grid-based algorithm.
    #[default]
    Blockhash64,
}

/// Perceptual hasher configuration and computation.
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptualHasher {
    algorithm: HashAlgorithm,
    downscale: f32,
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::default())
    }
}

impl PerceptualHasher {
    /// Create a new perceptual hasher with the specified algorithm and no
    /// preprocessing.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            downscale: 1.0,
        }
    }

    /// Resize every frame by `factor` (bilinear) before hashing.
    ///
    /// Out-of-range factors are clamped to `(0, 1]`; use
    /// [`PerceptualHasher::validate_downscale`] to reject them up front.
    pub fn with_downscale(mut self, factor: f32) -> Self {
        self.downscale = if factor.is_finite() && factor > 0.0 {
            factor.min(1.0)
        } else {
            1.0
        };
        self
    }

    /// Check that `factor` is a usable downscale factor.
    pub fn validate_downscale(factor: f32) -> Result<f32> {
        if factor.is_finite() && factor > 0.0 && factor <= 1.0 {
            Ok(factor)
        } else {
            Err(VidseekError::InvalidQuery(format!(
                "Downscale factor must be in (0, 1], got {}",
                factor
            )))
        }
    }

    /// Get the algorithm used by this hasher.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn downscale(&self) -> f32 {
        self.downscale
    }

    fn preprocess<'a>(&self, frame: &'a DynamicImage) -> Cow<'a, DynamicImage> {
        if self.downscale >= 1.0 {
            return Cow::Borrowed(frame);
        }
        let width = ((frame.width() as f32) * self.downscale).round().max(1.0) as u32;
        let height = ((frame.height() as f32) * self.downscale).round().max(1.0) as u32;
        Cow::Owned(frame.resize_exact(width, height, FilterType::Triangle))
    }
}

impl FrameHasher for PerceptualHasher {
    fn hash(&self, frame: &DynamicImage) -> Fingerprint {
        let frame = self.preprocess(frame);
        match self.algorithm {
            HashAlgorithm::Blockhash64 => {
                let hash: Blockhash64 = blockhash64(&*frame);
                let hash_bytes: [u8; FINGERPRINT_SIZE] = hash.into();
                Fingerprint::from_bytes(hash_bytes)
            }
        }
    }

    fn downscale(&self) -> f32 {
        self.downscale
    }
}
