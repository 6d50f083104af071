//! Haystack manifest.
//!
//! The manifest is the explicit list of haystacks a session works with: one
//! entry per haystack naming its identifier, the source video, the
//! fingerprint record file, the stride it was sampled at and, once ingested,
//! the downscale factor its frames were hashed with. It is stored as JSON:
//!
//! ```json
//! {
//!   "haystacks": [
//!     { "id": 1, "video": "videos/haystack1.mp4", "fingerprints": "hashed/haystack1.hay", "stride": 1, "downscale": 0.5 }
//!   ]
//! }
//! ```
//!
//! Relative paths are resolved against the directory containing the manifest.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::database::HaystackId;
use crate::error::{Result, VidseekError};
use crate::ingest::IngestedHaystack;
use crate::sequence::validate_stride;

/// File extension used for fingerprint record files.
pub const RECORD_EXTENSION: &str = "hay";

fn default_stride() -> u32 {
    1
}

/// One haystack in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: HaystackId,
    /// Source video (file or frame directory). Only needed for ingestion and
    /// playback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<PathBuf>,
    /// Persisted fingerprint record file.
    pub fingerprints: PathBuf,
    /// Sampling stride the record was built with.
    #[serde(default = "default_stride")]
    pub stride: u32,
    /// Downscale factor the record was hashed with. Unknown for records
    /// produced outside `vidseek ingest`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downscale: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub haystacks: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(haystacks: Vec<ManifestEntry>) -> Result<Self> {
        let manifest = Self { haystacks };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a manifest file, resolving relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| VidseekError::io(path, e))?;
        let mut manifest: Manifest = serde_json::from_slice(&bytes).map_err(|e| {
            VidseekError::InvalidManifest(format!("{}: {}", path.display(), e))
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for entry in &mut manifest.haystacks {
            entry.fingerprints = resolve(base, &entry.fingerprints);
            entry.video = entry.video.as_deref().map(|v| resolve(base, v));
        }
        manifest.validate()?;

        debug!(
            path = %path.display(),
            haystacks = manifest.haystacks.len(),
            "Loaded manifest"
        );
        Ok(manifest)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| VidseekError::InvalidManifest(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| VidseekError::io(path, e))
    }

    /// Build a manifest from a directory of haystack videos.
    ///
    /// Each entry whose file stem ends in digits becomes a haystack with that
    /// number as its identifier (`haystack7.mp4` -> 7), fingerprinted into
    /// `fingerprint_dir/haystack7.hay`. Other entries are skipped.
    pub fn scan(video_dir: &Path, fingerprint_dir: &Path, stride: u32) -> Result<Self> {
        validate_stride(stride)?;
        let entries = std::fs::read_dir(video_dir).map_err(|e| VidseekError::io(video_dir, e))?;

        let mut haystacks = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| VidseekError::io(video_dir, e))?.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(id) = trailing_number(stem) else {
                warn!(path = %path.display(), "Skipping video without a numeric suffix");
                continue;
            };
            haystacks.push(ManifestEntry {
                id: HaystackId(id),
                fingerprints: fingerprint_dir.join(format!("{}.{}", stem, RECORD_EXTENSION)),
                video: Some(path),
                stride,
                downscale: None,
            });
        }
        haystacks.sort_by_key(|entry| entry.id);

        Self::new(haystacks)
    }

    pub fn len(&self) -> usize {
        self.haystacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.haystacks.is_empty()
    }

    pub fn get(&self, id: HaystackId) -> Option<&ManifestEntry> {
        self.haystacks.iter().find(|entry| entry.id == id)
    }

    /// Record the downscale factor of every haystack `report` wrote.
    ///
    /// Returns whether any entry changed.
    pub fn apply_ingest(&mut self, report: &[IngestedHaystack]) -> bool {
        let mut changed = false;
        for item in report {
            let Some(downscale) = item.downscale else {
                continue;
            };
            if let Some(entry) = self.haystacks.iter_mut().find(|e| e.id == item.id) {
                changed |= entry.downscale != Some(downscale);
                entry.downscale = Some(downscale);
            }
        }
        changed
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.haystacks.len());
        for entry in &self.haystacks {
            if !seen.insert(entry.id) {
                return Err(VidseekError::InvalidManifest(format!(
                    "duplicate haystack id {}",
                    entry.id
                )));
            }
            if entry.stride == 0 {
                return Err(VidseekError::InvalidManifest(format!(
                    "haystack {} has stride 0",
                    entry.id
                )));
            }
            if let Some(factor) = entry.downscale {
                if !(factor.is_finite() && factor > 0.0 && factor <= 1.0) {
                    return Err(VidseekError::InvalidManifest(format!(
                        "haystack {} has downscale {}",
                        entry.id, factor
                    )));
                }
            }
        }
        Ok(())
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn trailing_number(stem: &str) -> Option<u32> {
    let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    stem[stem.len() - digits..].parse().ok()
}
