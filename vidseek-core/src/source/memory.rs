use std::collections::VecDeque;

use image::DynamicImage;

use super::FrameSource;
use crate::error::Result;

/// Frames already decoded into memory.
#[derive(Default)]
pub struct MemorySource {
    frames: VecDeque<DynamicImage>,
    position: u64,
    total: u64,
}

impl MemorySource {
    pub fn new(frames: impl IntoIterator<Item = DynamicImage>) -> Self {
        let frames: VecDeque<_> = frames.into_iter().collect();
        let total = frames.len() as u64;
        Self {
            frames,
            position: 0,
            total,
        }
    }
}

impl FrameSource for MemorySource {
    fn position(&self) -> u64 {
        self.position
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>> {
        let frame = self.frames.pop_front();
        if frame.is_some() {
            self.position += 1;
        }
        Ok(frame)
    }

    fn frame_count_hint(&self) -> Option<u64> {
        Some(self.total)
    }
}
