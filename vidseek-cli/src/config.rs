//! CLI configuration
//!
//! Settings are loaded from `VIDSEEK_*` environment variables with sensible
//! defaults; explicit command-line flags override them afterwards.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;
use vidseek_core::DEFAULT_HIT_THRESHOLD;

/// Runtime settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Manifest path (default: haystacks.json)
    pub manifest: PathBuf,
    /// Needle sampling stride (default: 3)
    pub query_stride: u32,
    /// Haystack sampling stride used when building a manifest (default: 1)
    pub ingest_stride: u32,
    /// Resize factor applied before hashing (default: 0.5)
    pub downscale: f32,
    /// Frame rate used to turn offsets into playback time (default: 30)
    pub fps: f64,
    /// Per-frame distance under which a window counts as a hit (default: 8)
    pub hit_threshold: u32,
    /// Viewer command template with `{path}` and `{seconds}` placeholders
    pub viewer: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("haystacks.json"),
            query_stride: 3,
            ingest_stride: 1,
            downscale: 0.5,
            fps: 30.0,
            hit_threshold: DEFAULT_HIT_THRESHOLD,
            viewer: None,
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through `lookup`; unparsable values are logged and fall
    /// back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let manifest = lookup("VIDSEEK_MANIFEST")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.manifest);

        let query_stride = parsed(&lookup, "VIDSEEK_QUERY_STRIDE", defaults.query_stride);
        let ingest_stride = parsed(&lookup, "VIDSEEK_INGEST_STRIDE", defaults.ingest_stride);
        let downscale = parsed(&lookup, "VIDSEEK_DOWNSCALE", defaults.downscale);
        let fps = parsed(&lookup, "VIDSEEK_FPS", defaults.fps);
        let hit_threshold = parsed(&lookup, "VIDSEEK_HIT_THRESHOLD", defaults.hit_threshold);

        let viewer = lookup("VIDSEEK_VIEWER").filter(|v| !v.trim().is_empty());

        Self {
            manifest,
            query_stride,
            ingest_stride,
            downscale,
            fps,
            hit_threshold,
            viewer,
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(variable = key, value = %raw, "Ignoring unparsable setting, using default");
            default
        }
    }
}
