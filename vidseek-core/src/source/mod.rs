//! Frame sources.
//!
//! A [`FrameSource`] yields decoded raster frames one at a time, in
//! presentation order, and tracks the index of the next frame it will
//! produce. Sources are consumed by the
//! [`SequenceBuilder`](crate::sequence::SequenceBuilder).
//!
//! - [`ImageSequenceSource`] - a directory of still frames
//! - [`MemorySource`] - frames already held in memory
//! - `FfmpegSource` - container files, behind the `ffmpeg` feature

mod image_seq;
mod memory;

#[cfg(feature = "ffmpeg")]
mod ffmpeg;

use std::path::Path;

use image::DynamicImage;

use crate::error::{Result, VidseekError};

pub use image_seq::ImageSequenceSource;
pub use memory::MemorySource;

#[cfg(feature = "ffmpeg")]
pub use self::ffmpeg::FfmpegSource;

/// Sequential decoder over the frames of one video.
pub trait FrameSource {
    /// Raw index of the frame the next call to [`FrameSource::next_frame`]
    /// returns. Starts at 0.
    fn position(&self) -> u64;

    /// Decode the next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> Result<Option<DynamicImage>>;

    /// Total frame count, when the source knows it up front.
    fn frame_count_hint(&self) -> Option<u64> {
        None
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn position(&self) -> u64 {
        (**self).position()
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>> {
        (**self).next_frame()
    }

    fn frame_count_hint(&self) -> Option<u64> {
        (**self).frame_count_hint()
    }
}

/// Open the best available source for `location`.
///
/// Directories are read as image sequences. Files are decoded with ffmpeg
/// when the `ffmpeg` feature is enabled and rejected with
/// [`VidseekError::SourceUnavailable`] otherwise.
pub fn open_source(location: &Path) -> Result<Box<dyn FrameSource>> {
    if location.is_dir() {
        return Ok(Box::new(ImageSequenceSource::open(location)?));
    }
    if !location.exists() {
        return Err(VidseekError::source_unavailable(
            location,
            "no such file or directory",
        ));
    }
    open_container(location)
}

#[cfg(feature = "ffmpeg")]
fn open_container(location: &Path) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(FfmpegSource::open(location)?))
}

#[cfg(not(feature = "ffmpeg"))]
fn open_container(location: &Path) -> Result<Box<dyn FrameSource>> {
    Err(VidseekError::source_unavailable(
        location,
        "container decoding requires the `ffmpeg` feature; pass a directory of frames instead",
    ))
}
