use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tracing::debug;

use super::FrameSource;
use crate::error::{Result, VidseekError};

/// Frames stored as individual image files in one directory.
///
/// Files are ordered by file name, so frame dumps should use zero-padded
/// numbering (`frame_000001.png`, ...). Entries that are not a recognized
/// image format are ignored.
pub struct ImageSequenceSource {
    location: PathBuf,
    frames: Vec<PathBuf>,
    position: usize,
}

impl ImageSequenceSource {
    pub fn open(location: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(location)
            .map_err(|e| VidseekError::source_unavailable(location, e))?;

        let mut frames = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| VidseekError::source_unavailable(location, e))?
                .path();
            if path.is_file() && ImageFormat::from_path(&path).is_ok() {
                frames.push(path);
            }
        }
        frames.sort();

        debug!(
            location = %location.display(),
            frames = frames.len(),
            "Opened image sequence"
        );

        Ok(Self {
            location: location.to_path_buf(),
            frames,
            position: 0,
        })
    }

    pub fn location(&self) -> &Path {
        &self.location
    }
}

impl FrameSource for ImageSequenceSource {
    fn position(&self) -> u64 {
        self.position as u64
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>> {
        let Some(path) = self.frames.get(self.position) else {
            return Ok(None);
        };
        let frame = image::open(path).map_err(|e| VidseekError::FrameDecode {
            location: path.clone(),
            frame: self.position as u64,
            reason: e.to_string(),
        })?;
        self.position += 1;
        Ok(Some(frame))
    }

    fn frame_count_hint(&self) -> Option<u64> {
        Some(self.frames.len() as u64)
    }
}
